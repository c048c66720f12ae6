//! FFprobe integration for media property extraction
//!
//! Probing is advisory: every failure (missing binary, timeout, nonzero
//! exit, garbage output) is logged and turned into `None`, and the decision
//! engine falls back to a pass-through remux.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use super::MediaProber;
use crate::config::CoreConfig;
use crate::processing::media_properties::{AspectRatio, MediaProperties};
use crate::util::command::{CancelFlag, run_command};
use crate::utils::truncate_diagnostic;

const SHOW_ENTRIES: &str = "stream=codec_name,width,height,sample_aspect_ratio,display_aspect_ratio";

#[derive(Debug, Deserialize, Default)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize, Default)]
struct ProbeStream {
    codec_name: Option<String>,
    width: Option<i64>,
    height: Option<i64>,
    sample_aspect_ratio: Option<String>,
    display_aspect_ratio: Option<String>,
}

fn dimension(value: Option<i64>) -> u32 {
    value
        .filter(|v| *v > 0)
        .map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX))
}

fn known(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("N/A"))
}

/// Parses `ffprobe -of json` output for the first video stream.
///
/// Returns `None` for unparsable JSON or when no stream was reported.
pub fn parse_probe_output(json: &str) -> Option<MediaProperties> {
    let output: ProbeOutput = match serde_json::from_str(json) {
        Ok(o) => o,
        Err(e) => {
            warn!("Unparsable ffprobe output: {e}");
            return None;
        }
    };

    let stream = output.streams.into_iter().next()?;
    let sar = known(stream.sample_aspect_ratio).and_then(|s| s.parse::<AspectRatio>().ok());

    Some(MediaProperties {
        width: dimension(stream.width),
        height: dimension(stream.height),
        sar,
        dar: known(stream.display_aspect_ratio),
        codec: known(stream.codec_name).map(|c| c.to_ascii_lowercase()),
    })
}

/// Probe adapter backed by the ffprobe binary.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe: PathBuf,
    timeout: Duration,
    diagnostic_limit: usize,
}

impl FfprobeProber {
    pub fn new(ffprobe: PathBuf, timeout: Duration) -> Self {
        Self {
            ffprobe,
            timeout,
            diagnostic_limit: crate::config::DEFAULT_DIAGNOSTIC_LIMIT,
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            ffprobe: config.tools.ffprobe.clone(),
            timeout: config.probe_timeout,
            diagnostic_limit: config.diagnostic_limit,
        }
    }
}

impl MediaProber for FfprobeProber {
    fn probe(&self, path: &Path) -> Option<MediaProperties> {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args(["-v", "error", "-select_streams", "v:0", "-show_entries", SHOW_ENTRIES, "-of", "json"])
            .arg(path);

        // Probing is not interruptible on its own; the orchestrator checks
        // cancellation around it and the timeout bounds it.
        let output = match run_command(&mut cmd, Some(self.timeout), &CancelFlag::new()) {
            Ok(o) => o,
            Err(e) => {
                warn!("ffprobe failed for {}: {e}", path.display());
                return None;
            }
        };

        if !output.success() {
            warn!(
                "ffprobe exited with {} for {}: {}",
                output.status,
                path.display(),
                truncate_diagnostic(&output.stderr, self.diagnostic_limit)
            );
            return None;
        }

        let props = parse_probe_output(&output.stdout);
        match &props {
            Some(p) => debug!("Probed {}: {p}", path.display()),
            None => warn!("ffprobe reported no video stream for {}", path.display()),
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_anamorphic_stream() {
        let json = r#"{
            "programs": [],
            "streams": [{
                "codec_name": "H264",
                "width": 720,
                "height": 480,
                "sample_aspect_ratio": "32:27",
                "display_aspect_ratio": "16:9"
            }]
        }"#;
        let props = parse_probe_output(json).unwrap();
        assert_eq!(props.width, 720);
        assert_eq!(props.height, 480);
        assert_eq!(props.sar, Some(AspectRatio::new(32, 27)));
        assert_eq!(props.dar.as_deref(), Some("16:9"));
        assert_eq!(props.codec.as_deref(), Some("h264"));
    }

    #[test]
    fn test_parse_missing_and_na_fields() {
        let json = r#"{"streams": [{"codec_name": "vp9", "sample_aspect_ratio": "N/A"}]}"#;
        let props = parse_probe_output(json).unwrap();
        assert_eq!(props.width, 0);
        assert_eq!(props.height, 0);
        assert_eq!(props.sar, None);
        assert_eq!(props.dar, None);
    }

    #[test]
    fn test_parse_malformed_sar_and_negative_dimensions() {
        let json = r#"{"streams": [{"width": -1, "height": 1080, "sample_aspect_ratio": "wide"}]}"#;
        let props = parse_probe_output(json).unwrap();
        assert_eq!(props.width, 0);
        assert_eq!(props.height, 1080);
        assert_eq!(props.sar, None);
        assert_eq!(props.codec, None);
    }

    #[test]
    fn test_parse_no_streams_or_garbage() {
        assert_eq!(parse_probe_output(r#"{"streams": []}"#), None);
        assert_eq!(parse_probe_output("{}"), None);
        assert_eq!(parse_probe_output("not json"), None);
    }

    #[test]
    fn test_missing_binary_yields_none() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"data")?;
        let prober = FfprobeProber::new(PathBuf::from("reelfix-missing-ffprobe"), Duration::from_secs(5));
        assert_eq!(prober.probe(&input), None);
        Ok(())
    }
}
