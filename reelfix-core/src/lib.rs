//! Core library for acquiring remote media and normalizing it for delivery.
//!
//! A request goes through URL classification, a yt-dlp download with ordered
//! strategy fallback, ffprobe probing, a transcode decision, an ffmpeg run,
//! output validation and finally a delivery-size check. The external tools do
//! the byte-level work; this crate decides how and when they run.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use reelfix_core::config::{CoreConfigBuilder, TransportMode};
//! use reelfix_core::{CancelFlag, build_pipeline, delivery};
//!
//! let config = CoreConfigBuilder::new().build().unwrap();
//! let pipeline = build_pipeline(config);
//!
//! let delivered = pipeline.acquire_scoped(
//!     "https://x.com/someone/status/1234567890",
//!     TransportMode::Hosted,
//!     &CancelFlag::new(),
//!     |artifact| {
//!         // The scratch directory disappears after this closure returns.
//!         if delivery::fits(artifact.size_bytes, TransportMode::Hosted) {
//!             std::fs::copy(&artifact.path, "clip.mp4").map(|_| ())
//!         } else {
//!             Ok(())
//!         }
//!     },
//! );
//! ```

pub mod config;
pub mod delivery;
pub mod error;
pub mod external;
pub mod processing;
pub mod temp_files;
pub mod util;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, TranscodeMode, TransportMode};
pub use error::{
    AcquisitionError, CoreError, CoreResult, DownloadError, TranscodeError, TranscodeErrorKind,
    ValidationError,
};
pub use external::{
    DownloadRequest, DownloadResult, Downloader, FfmpegTranscoder, FfprobeProber, MediaProber,
    Transcoder, YtDlpDownloader, check_dependency, resolve_tool,
};
pub use processing::{
    AcquisitionRequest, Artifact, MediaProperties, Pipeline, PlanKind, TranscodePlan, classify,
    decide,
};
pub use util::command::CancelFlag;
pub use utils::format_bytes;

/// The pipeline wired to the real external tools.
pub type ToolPipeline = Pipeline<YtDlpDownloader, FfprobeProber, FfmpegTranscoder>;

/// Builds a pipeline backed by yt-dlp, ffprobe and ffmpeg from `config`.
pub fn build_pipeline(config: CoreConfig) -> ToolPipeline {
    let downloader = YtDlpDownloader::from_config(&config);
    let prober = FfprobeProber::from_config(&config);
    let transcoder = FfmpegTranscoder::from_config(&config);
    Pipeline::new(config, downloader, prober, transcoder)
}
