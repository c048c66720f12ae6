//! FFmpeg execution
//!
//! [`FfmpegTranscoder`] runs the command built by
//! [`build_transcode_command`] under the process runner, with a time ceiling
//! and cancellation, and classifies failures into [`TranscodeErrorKind`].

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use log::{debug, info};

use super::Transcoder;
use super::ffmpeg_builder::{build_transcode_command, output_path_for};
use crate::config::CoreConfig;
use crate::error::{TranscodeError, TranscodeErrorKind};
use crate::processing::decision::TranscodePlan;
use crate::util::command::{CancelFlag, CommandError, run_command};
use crate::utils::{display_name, truncate_diagnostic};

/// Transcoder adapter backed by the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg: PathBuf,
    target_extension: String,
    diagnostic_limit: usize,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg: PathBuf, target_extension: &str, diagnostic_limit: usize) -> Self {
        Self {
            ffmpeg,
            target_extension: target_extension.trim_start_matches('.').to_string(),
            diagnostic_limit,
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            config.tools.ffmpeg.clone(),
            config.target_extension(),
            config.diagnostic_limit,
        )
    }
}

fn map_command_error(err: CommandError) -> TranscodeError {
    match err {
        CommandError::NotFound(program) => TranscodeError::new(
            TranscodeErrorKind::ToolMissing,
            format!("{program} is not installed or not on PATH"),
        ),
        CommandError::Timeout(limit) => TranscodeError::new(
            TranscodeErrorKind::Timeout,
            format!("no result after {} seconds", limit.as_secs()),
        ),
        CommandError::Cancelled => {
            TranscodeError::new(TranscodeErrorKind::Cancelled, "stopped on request")
        }
        other @ (CommandError::Spawn { .. } | CommandError::Wait(_)) => {
            TranscodeError::new(TranscodeErrorKind::Io, other.to_string())
        }
    }
}

impl Transcoder for FfmpegTranscoder {
    fn run(
        &self,
        input: &Path,
        plan: &TranscodePlan,
        output_dir: &Path,
        timeout: Duration,
        cancel: &CancelFlag,
    ) -> Result<PathBuf, TranscodeError> {
        let output = output_path_for(input, plan.kind, output_dir, &self.target_extension);
        let ffmpeg_cmd = build_transcode_command(input, plan, &output);

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(ffmpeg_cmd.get_args());

        info!(
            "Transcoding {} ({}): {}",
            display_name(input),
            plan.kind,
            plan.reason
        );

        let result = run_command(&mut cmd, Some(timeout), cancel).map_err(map_command_error)?;
        if !result.success() {
            return Err(TranscodeError::new(
                TranscodeErrorKind::NonZeroExit,
                format!(
                    "exit {}: {}",
                    result.status.code().map_or_else(|| "signal".to_string(), |c| c.to_string()),
                    truncate_diagnostic(&result.stderr, self.diagnostic_limit)
                ),
            ));
        }

        debug!("ffmpeg wrote {}", output.display());
        Ok(output)
    }
}
