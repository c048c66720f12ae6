// ============================================================================
// reelfix-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Adapters for yt-dlp, ffprobe and ffmpeg
//
// This module encapsulates every interaction with external command-line
// tools. The pipeline only ever talks to the three traits defined here, so
// tests can swap in fakes and the real adapters stay thin.
//
// KEY COMPONENTS:
// - Downloader, MediaProber, Transcoder: the adapter seams
// - YtDlpDownloader, FfprobeProber, FfmpegTranscoder: real implementations
// - resolve_tool: locating a tool binary
// - check_dependency: verifying a tool is runnable

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, DownloadError, TranscodeError};
use crate::processing::classify::Platform;
use crate::processing::decision::TranscodePlan;
use crate::processing::media_properties::MediaProperties;
use crate::util::command::CancelFlag;

// ---- Standard library imports ----
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

// ============================================================================
// SUBMODULES
// ============================================================================

/// ffmpeg argument construction from a transcode plan
pub mod ffmpeg_builder;

/// The ffmpeg-backed transcoder
pub mod ffmpeg_executor;

/// The ffprobe-backed prober
pub mod ffprobe_executor;

/// The yt-dlp-backed downloader
pub mod ytdlp_executor;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::FfmpegTranscoder;
pub use ffprobe_executor::FfprobeProber;
pub use ytdlp_executor::YtDlpDownloader;

// ============================================================================
// ADAPTER TRAITS
// ============================================================================

/// One download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    /// Private directory for this attempt; everything the downloader writes lands here.
    pub output_dir: PathBuf,
    pub platform: Option<Platform>,
    /// Extraction strategy label, `None` for the downloader's default.
    pub strategy: Option<String>,
}

/// What the downloader reports back on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Final on-disk path as reported after post-processing.
    pub file_path: PathBuf,
    /// Filename the downloader declared before post-processing.
    pub declared_filename: String,
}

/// Fetches a URL into a directory.
pub trait Downloader: Send + Sync {
    fn download(
        &self,
        request: &DownloadRequest,
        cancel: &CancelFlag,
    ) -> Result<DownloadResult, DownloadError>;
}

/// Reads the properties of a media file.
///
/// Infallible by contract: anything that goes wrong is `None`.
pub trait MediaProber: Send + Sync {
    fn probe(&self, path: &Path) -> Option<MediaProperties>;
}

/// Executes a transcode plan and returns the path of the file it wrote.
pub trait Transcoder: Send + Sync {
    fn run(
        &self,
        input: &Path,
        plan: &TranscodePlan,
        output_dir: &Path,
        timeout: Duration,
        cancel: &CancelFlag,
    ) -> Result<PathBuf, TranscodeError>;
}

// ============================================================================
// TOOL RESOLUTION
// ============================================================================

const FALLBACK_TOOL_DIR: &str = "/usr/local/bin";

/// Finds the binary for `name`.
///
/// An explicit path always wins. Then PATH is searched, then
/// `/usr/local/bin`, and as a last resort the bare name is returned so the
/// failure surfaces as "not found" when the tool actually runs.
pub fn resolve_tool(explicit: Option<&Path>, name: &str) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(found) = which::which(name) {
        log::debug!("Resolved {} to {}", name, found.display());
        return found;
    }

    let fallback = Path::new(FALLBACK_TOOL_DIR).join(name);
    if fallback.is_file() {
        log::debug!("Resolved {} to {}", name, fallback.display());
        return fallback;
    }

    log::debug!("{} not found on PATH or in {}", name, FALLBACK_TOOL_DIR);
    PathBuf::from(name)
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external command is available and starts.
///
/// Runs `program version_arg` with output discarded; the exit status is not
/// inspected.
///
/// # Returns
///
/// * `Ok(())` - The command started
/// * `Err(CoreError::DependencyNotFound)` - The command is not installed
/// * `Err(CoreError::CommandStart)` - The command exists but fails to start
pub fn check_dependency(program: &Path, version_arg: &str) -> CoreResult<()> {
    let label = program.display().to_string();
    let result = Command::new(program)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", label);
            Ok(())
        }
        Err(e) => {
            if e.kind() == io::ErrorKind::NotFound {
                log::warn!("Dependency '{}' not found.", label);
                Err(CoreError::DependencyNotFound(label))
            } else {
                log::error!("Failed to start dependency check command '{}': {}", label, e);
                Err(crate::error::command_start_error(label, e))
            }
        }
    }
}
