// ============================================================================
// reelfix-core/src/processing/decision.rs
// ============================================================================
//
// TRANSCODE DECISION: Choosing Remux, Geometry Fix or Full Re-encode
//
// A pure function from probed media properties and the configured mode to a
// TranscodePlan. Nothing here touches the file system or spawns processes,
// so the rules are tested exhaustively in isolation.
//
// RULES:
// - PassthroughOnly always remuxes, whatever the probe said
// - A usable non-square SAR on a stream with known dimensions needs a
//   geometry fix (scale to square pixels, then setsar=1)
// - CompatibilityReencode always re-encodes, folding the fix in when needed
// - Auto fixes geometry when needed, upgrades incompatible codecs to a full
//   re-encode, and otherwise remuxes

use std::collections::BTreeMap;
use std::fmt;

use crate::config::{DecisionConfig, EncodeSettings, TranscodeMode};
use crate::processing::media_properties::MediaProperties;

/// Scales to square pixels with even dimensions.
pub const SQUARE_PIXEL_SCALE: &str = "scale=trunc(iw*sar/2)*2:trunc(ih/2)*2";

/// Marks the output as square-pixel.
pub const SETSAR_SQUARE: &str = "setsar=1";

/// The three kinds of work the transcoder can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    PassThroughRemux,
    GeometryFix,
    FullReencode,
}

impl PlanKind {
    /// Tag used in output filenames.
    pub fn file_tag(&self) -> &'static str {
        match self {
            Self::PassThroughRemux => "remux",
            Self::GeometryFix => "fixed",
            Self::FullReencode => "compat",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PassThroughRemux => "pass-through remux",
            Self::GeometryFix => "geometry fix",
            Self::FullReencode => "full re-encode",
        })
    }
}

/// What the transcoder should do with one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodePlan {
    pub kind: PlanKind,
    /// Video filters, applied in order. Empty for a remux.
    pub filter_chain: Vec<String>,
    /// Encoder options keyed by ffmpeg option name without the dash.
    pub video_codec_params: BTreeMap<String, String>,
    pub copy_subtitles: bool,
    /// Human-readable explanation for logs and the `plan` command.
    pub reason: String,
}

impl TranscodePlan {
    fn remux(reason: impl Into<String>) -> Self {
        Self {
            kind: PlanKind::PassThroughRemux,
            filter_chain: Vec::new(),
            video_codec_params: BTreeMap::new(),
            copy_subtitles: false,
            reason: reason.into(),
        }
    }
}

fn codec_params(settings: &EncodeSettings) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("c:v".to_string(), settings.codec.clone());
    params.insert("preset".to_string(), settings.preset.clone());
    params.insert("crf".to_string(), settings.crf.to_string());
    if let Some(profile) = &settings.profile {
        params.insert("profile:v".to_string(), profile.clone());
    }
    if let Some(pix_fmt) = &settings.pix_fmt {
        params.insert("pix_fmt".to_string(), pix_fmt.clone());
    }
    params
}

fn geometry_filters() -> Vec<String> {
    vec![SQUARE_PIXEL_SCALE.to_string(), SETSAR_SQUARE.to_string()]
}

/// Whether the stream's pixels must be squared before delivery.
pub fn needs_geometry_fix(props: &MediaProperties) -> bool {
    props.has_dimensions() && props.sar.is_some_and(|sar| sar.is_non_square())
}

/// Returns the codec when it is known and outside the compatible set.
fn incompatible_codec<'a>(props: &'a MediaProperties, config: &DecisionConfig) -> Option<&'a str> {
    let codec = props.codec.as_deref()?.trim();
    if codec.is_empty() {
        return None;
    }
    let compatible = config
        .compatible_codecs
        .iter()
        .any(|c| c.eq_ignore_ascii_case(codec));
    (!compatible).then_some(codec)
}

fn sar_label(props: &MediaProperties) -> String {
    props
        .sar
        .map_or_else(|| "unknown".to_string(), |sar| sar.to_string())
}

/// Decides how `props` should be transcoded under `config`.
///
/// Pure and total: every input yields a plan.
pub fn decide(props: &MediaProperties, config: &DecisionConfig) -> TranscodePlan {
    if config.mode == TranscodeMode::PassthroughOnly {
        return TranscodePlan::remux("pass-through only mode; stream copy");
    }

    let fix = needs_geometry_fix(props);

    if config.mode == TranscodeMode::CompatibilityReencode {
        let (filter_chain, reason) = if fix {
            (
                geometry_filters(),
                format!(
                    "compatibility re-encode; non-square SAR {} corrected",
                    sar_label(props)
                ),
            )
        } else {
            (
                vec![SETSAR_SQUARE.to_string()],
                "compatibility re-encode".to_string(),
            )
        };
        return TranscodePlan {
            kind: PlanKind::FullReencode,
            filter_chain,
            video_codec_params: codec_params(&config.compatibility),
            copy_subtitles: true,
            reason,
        };
    }

    if fix {
        return TranscodePlan {
            kind: PlanKind::GeometryFix,
            filter_chain: geometry_filters(),
            video_codec_params: codec_params(&config.geometry_fix),
            copy_subtitles: false,
            reason: format!(
                "non-square SAR {} on {}x{}; scaling to square pixels",
                sar_label(props),
                props.width,
                props.height
            ),
        };
    }

    if let Some(codec) = incompatible_codec(props, config) {
        return TranscodePlan {
            kind: PlanKind::FullReencode,
            filter_chain: vec![SETSAR_SQUARE.to_string()],
            video_codec_params: codec_params(&config.compatibility),
            copy_subtitles: true,
            reason: format!("codec {codec} is not broadly playable; re-encoding"),
        };
    }

    TranscodePlan::remux(format!("SAR {} is fine; stream copy", sar_label(props)))
}
