//! Configuration structures and constants for the reelfix-core library.
//!
//! The whole pipeline reads from one immutable [`CoreConfig`] that the
//! front-end builds once at start-up. Nothing in the library consults the
//! process environment while a request is in flight.

mod builder;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::processing::decision::PlanKind;

pub use builder::CoreConfigBuilder;

// Default constants

/// Container extension every delivered artifact ends up in.
pub const DEFAULT_TARGET_EXTENSION: &str = "mp4";

/// Extraction back-ends tried, in order, for platforms that expose several.
pub const DEFAULT_STRATEGY_ORDER: [&str; 3] = ["graphql", "legacy", "syndication"];

/// Video codecs that play everywhere without conversion.
pub const DEFAULT_COMPATIBLE_CODECS: [&str; 2] = ["h264", "hevc"];

/// yt-dlp format selector: best video plus best audio, or best combined.
pub const DEFAULT_FORMAT_SELECTOR: &str = "bestvideo*+bestaudio/best";

/// yt-dlp output template, relative to the attempt directory.
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title).200B.%(ext)s";

/// Ceiling for a single ffprobe invocation.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of characters of external tool output surfaced in errors.
pub const DEFAULT_DIAGNOSTIC_LIMIT: usize = 500;

/// Video encoder used for every re-encode.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// CRF used for re-encodes. 18 is visually lossless for x264.
pub const DEFAULT_CRF: u8 = 18;

// ============================================================================
// MODE SWITCHES
// ============================================================================

/// How aggressively the decision engine re-encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscodeMode {
    /// Re-encode only when probed properties demand it.
    #[default]
    Auto,
    /// Never re-encode; remux with stream copy only.
    PassthroughOnly,
    /// Always re-encode to a broadly compatible codec and pixel format.
    CompatibilityReencode,
}

impl fmt::Display for TranscodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::PassthroughOnly => "passthrough-only",
            Self::CompatibilityReencode => "compatibility",
        })
    }
}

impl FromStr for TranscodeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "passthrough-only" | "passthrough" | "remux" => Ok(Self::PassthroughOnly),
            "compatibility" | "compat" | "reencode" => Ok(Self::CompatibilityReencode),
            other => Err(format!(
                "unknown transcode mode '{other}' (expected auto, passthrough-only or compatibility)"
            )),
        }
    }
}

/// The transport the front-end forwards artifacts through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Self-hosted transport with relaxed size limits.
    Local,
    /// Public transport with strict size limits.
    #[default]
    Hosted,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Hosted => "hosted",
        })
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "hosted" | "public" => Ok(Self::Hosted),
            other => Err(format!(
                "unknown transport '{other}' (expected local or hosted)"
            )),
        }
    }
}

// ============================================================================
// ADAPTER SETTINGS
// ============================================================================

/// Video encoder settings for one kind of re-encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSettings {
    pub codec: String,
    pub preset: String,
    pub crf: u8,
    pub profile: Option<String>,
    pub pix_fmt: Option<String>,
}

impl EncodeSettings {
    /// Fast geometry-only correction.
    pub fn geometry_fix() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: "ultrafast".to_string(),
            crf: DEFAULT_CRF,
            profile: None,
            pix_fmt: None,
        }
    }

    /// Broad-compatibility encode: 8-bit 4:2:0 High profile H.264.
    pub fn compatibility() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: "fast".to_string(),
            crf: DEFAULT_CRF,
            profile: Some("high".to_string()),
            pix_fmt: Some("yuv420p".to_string()),
        }
    }
}

/// Settings handed to the yt-dlp adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderConfig {
    pub format_selector: String,
    pub output_template: String,
    pub user_agent: Option<String>,
    /// Shared cookie store; staged into each request's directory before use.
    pub cookies_path: Option<PathBuf>,
    pub retries: u32,
    pub fragment_retries: u32,
    pub file_access_retries: u32,
    pub extractor_retries: u32,
    pub socket_timeout: Duration,
    pub concurrent_fragments: u32,
    pub restrict_filenames: bool,
    /// JavaScript runtime passed to `--js-runtimes` (e.g. `deno:/usr/local/bin/deno`).
    pub js_runtime: Option<String>,
    /// Hard ceiling for one download attempt. `None` leaves it to yt-dlp.
    pub timeout: Option<Duration>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            format_selector: DEFAULT_FORMAT_SELECTOR.to_string(),
            output_template: DEFAULT_OUTPUT_TEMPLATE.to_string(),
            user_agent: None,
            cookies_path: None,
            retries: 5,
            fragment_retries: 5,
            file_access_retries: 3,
            extractor_retries: 3,
            socket_timeout: Duration::from_secs(30),
            concurrent_fragments: 4,
            restrict_filenames: true,
            js_runtime: None,
            timeout: None,
        }
    }
}

/// Locations of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ytdlp: PathBuf,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ytdlp: PathBuf::from("yt-dlp"),
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

/// Time ceilings for the transcoder, scaled to how much work a plan implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeTimeouts {
    pub remux: Duration,
    pub geometry_fix: Duration,
    pub full_reencode: Duration,
}

impl Default for TranscodeTimeouts {
    fn default() -> Self {
        Self {
            remux: Duration::from_secs(300),
            geometry_fix: Duration::from_secs(900),
            full_reencode: Duration::from_secs(1800),
        }
    }
}

impl TranscodeTimeouts {
    #[must_use]
    pub fn for_kind(&self, kind: PlanKind) -> Duration {
        match kind {
            PlanKind::PassThroughRemux => self.remux,
            PlanKind::GeometryFix => self.geometry_fix,
            PlanKind::FullReencode => self.full_reencode,
        }
    }
}

/// The slice of configuration the decision engine reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionConfig {
    pub mode: TranscodeMode,
    pub compatible_codecs: Vec<String>,
    pub geometry_fix: EncodeSettings,
    pub compatibility: EncodeSettings,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            mode: TranscodeMode::Auto,
            compatible_codecs: DEFAULT_COMPATIBLE_CODECS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            geometry_fix: EncodeSettings::geometry_fix(),
            compatibility: EncodeSettings::compatibility(),
        }
    }
}

impl DecisionConfig {
    /// A default decision config running in `mode`.
    pub fn with_mode(mode: TranscodeMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

// ============================================================================
// CORE CONFIGURATION
// ============================================================================

/// Main configuration structure for the reelfix-core library.
///
/// Built once by the front-end (usually through [`CoreConfigBuilder`]) and
/// shared read-only by every request.
///
/// # Examples
///
/// ```rust
/// use reelfix_core::config::{CoreConfigBuilder, TranscodeMode};
///
/// let config = CoreConfigBuilder::new()
///     .transcode_mode(TranscodeMode::CompatibilityReencode)
///     .strategy_order(["syndication", "graphql"])
///     .build()
///     .unwrap();
/// assert_eq!(config.strategy_order, vec!["syndication", "graphql"]);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Parent directory for per-request scratch directories (system temp dir when `None`)
    pub temp_root: Option<PathBuf>,

    /// Container extension of delivered artifacts, without the dot
    pub target_extension: String,

    /// Strategy labels tried for multi-strategy platforms, in order
    pub strategy_order: Vec<String>,

    /// Re-encode policy plus encoder settings
    pub decision: DecisionConfig,

    pub download: DownloaderConfig,

    pub tools: ToolPaths,

    pub probe_timeout: Duration,

    pub transcode_timeouts: TranscodeTimeouts,

    /// Maximum characters of tool diagnostics carried in errors
    pub diagnostic_limit: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            temp_root: None,
            target_extension: DEFAULT_TARGET_EXTENSION.to_string(),
            strategy_order: DEFAULT_STRATEGY_ORDER.iter().map(|s| s.to_string()).collect(),
            decision: DecisionConfig::default(),
            download: DownloaderConfig::default(),
            tools: ToolPaths::default(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            transcode_timeouts: TranscodeTimeouts::default(),
            diagnostic_limit: DEFAULT_DIAGNOSTIC_LIMIT,
        }
    }
}

impl CoreConfig {
    /// Checks the configuration for values the pipeline cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        let ext = self.target_extension.trim_start_matches('.');
        if ext.is_empty() || ext.contains(['/', '\\']) {
            return Err(CoreError::Config(format!(
                "target extension '{}' is not a valid file extension",
                self.target_extension
            )));
        }

        if self.download.format_selector.trim().is_empty() {
            return Err(CoreError::Config("format selector must not be empty".to_string()));
        }

        if self.download.output_template.trim().is_empty() {
            return Err(CoreError::Config("output template must not be empty".to_string()));
        }

        if self.download.concurrent_fragments == 0 {
            return Err(CoreError::Config(
                "concurrent fragment downloads must be at least 1".to_string(),
            ));
        }

        if self.probe_timeout.is_zero() {
            return Err(CoreError::Config("probe timeout must be non-zero".to_string()));
        }

        let timeouts = &self.transcode_timeouts;
        if timeouts.remux.is_zero() || timeouts.geometry_fix.is_zero() || timeouts.full_reencode.is_zero() {
            return Err(CoreError::Config("transcode timeouts must be non-zero".to_string()));
        }

        if self.diagnostic_limit == 0 {
            return Err(CoreError::Config("diagnostic limit must be non-zero".to_string()));
        }

        for settings in [&self.decision.geometry_fix, &self.decision.compatibility] {
            if settings.crf > 51 {
                return Err(CoreError::Config(format!(
                    "CRF {} is out of range (0-51)",
                    settings.crf
                )));
            }
            if settings.codec.trim().is_empty() || settings.preset.trim().is_empty() {
                return Err(CoreError::Config(
                    "encoder codec and preset must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Target extension without a leading dot.
    #[must_use]
    pub fn target_extension(&self) -> &str {
        self.target_extension.trim_start_matches('.')
    }
}
