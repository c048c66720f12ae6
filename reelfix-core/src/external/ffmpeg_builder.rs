//! FFmpeg command construction from a transcode plan
//!
//! Turns a [`TranscodePlan`] into ffmpeg arguments. Kept separate from the
//! executor so the argument lists can be checked without running anything.

use std::path::{Path, PathBuf};

use ffmpeg_sidecar::command::FfmpegCommand;

use crate::processing::decision::{PlanKind, TranscodePlan};

/// Builder for constructing video filter chains
#[derive(Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the chain, skipping blanks
    #[must_use]
    pub fn add_filter(mut self, filter: &str) -> Self {
        let filter = filter.trim();
        if !filter.is_empty() {
            self.filters.push(filter.to_string());
        }
        self
    }

    /// Builds the filter chain into a single `-vf` value
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}

/// Deterministic output path: `<stem>.<tag>.<ext>` inside `output_dir`.
#[must_use]
pub fn output_path_for(input: &Path, kind: PlanKind, output_dir: &Path, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().into_owned());
    output_dir.join(format!(
        "{stem}.{}.{}",
        kind.file_tag(),
        ext.trim_start_matches('.')
    ))
}

/// Builds the ffmpeg command for `plan`.
///
/// The returned command carries arguments only; the executor decides which
/// binary runs them.
#[must_use]
pub fn build_transcode_command(input: &Path, plan: &TranscodePlan, output: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.args(["-hide_banner", "-y"]);
    cmd.input(input);

    match plan.kind {
        PlanKind::PassThroughRemux => {
            cmd.args(["-c", "copy"]);
        }
        PlanKind::GeometryFix | PlanKind::FullReencode => {
            let chain = plan
                .filter_chain
                .iter()
                .fold(VideoFilterChain::new(), |chain, f| chain.add_filter(f));
            if let Some(vf) = chain.build() {
                cmd.args(["-vf", vf.as_str()]);
            }

            for (key, value) in &plan.video_codec_params {
                cmd.arg(format!("-{key}"));
                cmd.arg(value);
            }

            cmd.args(["-c:a", "copy"]);
            if plan.copy_subtitles {
                cmd.args(["-c:s", "copy"]);
            }
        }
    }

    cmd.args(["-movflags", "+faststart"]);
    cmd.output(output);
    cmd
}

/// Argument list of a built command, for logging and tests.
#[must_use]
pub fn command_args(cmd: &FfmpegCommand) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}
