// ============================================================================
// reelfix-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the Acquisition Pipeline
//
// This module defines the error taxonomy used across reelfix-core. Each stage
// of the pipeline that can fail terminally has its own error type so callers
// can tell a download failure from a transcode failure without parsing
// strings. Stages that are advisory (probing, path normalization) have no
// error type at all: they degrade to conservative defaults instead.
//
// KEY COMPONENTS:
// - DownloadError: a failed downloader attempt, tagged with its strategy
// - TranscodeError: a failed transcoder run, classified by TranscodeErrorKind
// - ValidationError: a produced file that is missing, empty or unreadable
// - AcquisitionError: the orchestrator's terminal error for one request
// - CoreError: configuration and front-end level failures

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// STAGE ERRORS
// ============================================================================

/// A single downloader attempt failed.
///
/// `cause` is always bounded in length; raw tool output never ends up here
/// unabridged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("download failed ({}): {cause}", .strategy.as_deref().unwrap_or("default strategy"))]
pub struct DownloadError {
    /// The strategy label of the failed attempt, if any.
    pub strategy: Option<String>,
    /// Human-readable cause.
    pub cause: String,
}

impl DownloadError {
    pub fn new(strategy: Option<&str>, cause: impl Into<String>) -> Self {
        Self {
            strategy: strategy.map(str::to_string),
            cause: cause.into(),
        }
    }
}

/// Classification of transcoder failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeErrorKind {
    /// The transcoder binary could not be found or executed.
    ToolMissing,
    /// The transcoder ran and exited unsuccessfully.
    NonZeroExit,
    /// The transcoder exceeded its time ceiling and was killed.
    Timeout,
    /// The caller cancelled the request while the transcoder was running.
    Cancelled,
    /// Spawning or waiting on the process failed for another reason.
    Io,
}

impl fmt::Display for TranscodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ToolMissing => "transcoder not found",
            Self::NonZeroExit => "transcoder failed",
            Self::Timeout => "transcoder timed out",
            Self::Cancelled => "transcode cancelled",
            Self::Io => "transcoder I/O error",
        };
        f.write_str(label)
    }
}

/// The transcoder adapter failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct TranscodeError {
    pub kind: TranscodeErrorKind,
    /// Bounded diagnostic detail.
    pub detail: String,
}

impl TranscodeError {
    pub fn new(kind: TranscodeErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// A file expected to be deliverable failed validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("file does not exist: {0}")]
    MissingFile(PathBuf),

    #[error("file is empty: {0}")]
    EmptyFile(PathBuf),

    #[error("cannot read file metadata for {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ============================================================================
// ORCHESTRATOR ERROR
// ============================================================================

/// Terminal error of one acquisition request.
///
/// When every download strategy fails, only the last strategy's error is
/// carried here; earlier ones are logged and dropped.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to prepare working directory: {0}")]
    Workspace(#[source] io::Error),

    #[error("acquisition cancelled")]
    Cancelled,
}

// ============================================================================
// CORE ERROR
// ============================================================================

/// Errors outside a single acquisition: configuration, dependency checks and
/// front-end plumbing.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Required external command '{0}' not found")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for reelfix-core operations outside the pipeline.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`] with a consistent command label.
pub fn command_start_error(cmd_name: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd_name.into(), err)
}
