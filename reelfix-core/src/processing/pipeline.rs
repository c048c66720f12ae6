// ============================================================================
// reelfix-core/src/processing/pipeline.rs
// ============================================================================
//
// ACQUISITION PIPELINE: From URL to Validated Artifact
//
// This module houses the orchestration of one acquisition request. It ties
// the classifier, the three external adapters, the decision engine and the
// validator together, and owns the download fallback state machine.
//
// KEY COMPONENTS:
// - AcquisitionRequest: one URL plus its private working directory
// - FallbackState: Attempting(i) -> Succeeded | Attempting(i+1) | Exhausted
// - Pipeline: generic over Downloader, MediaProber and Transcoder
// - acquire / acquire_scoped / acquire_batch: the entry points
//
// WORKFLOW:
// 1. Classify the URL into a strategy plan
// 2. Download, one attempt per strategy, each in its own attempt directory
// 3. Resolve the real downloaded path and validate it
// 4. Probe, decide, transcode under a per-plan time ceiling
// 5. Validate the transcoder's output and return it as an Artifact

// ---- Internal crate imports ----
use crate::config::{CoreConfig, TransportMode};
use crate::error::{AcquisitionError, CoreError, DownloadError, TranscodeErrorKind};
use crate::external::{DownloadRequest, DownloadResult, Downloader, MediaProber, Transcoder};
use crate::processing::classify::{StrategyAttempt, StrategyPlan, classify};
use crate::processing::decision::decide;
use crate::processing::normalize::resolve_download_path;
use crate::processing::validation::{Artifact, validate_artifact};
use crate::temp_files::create_request_workspace;
use crate::util::command::CancelFlag;
use crate::utils::{display_name, format_bytes};

// ---- External crate imports ----
use log::{debug, error, info, warn};
use rayon::prelude::*;

// ---- Standard library imports ----
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Prefix of per-request scratch directories.
const WORKSPACE_PREFIX: &str = "reelfix-";

/// One acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionRequest {
    pub url: String,
    /// Private directory owned by this request alone.
    pub working_dir: PathBuf,
    pub transport_mode: TransportMode,
}

// ============================================================================
// FALLBACK STATE MACHINE
// ============================================================================

/// Where the download loop stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackState {
    /// About to run the attempt at this index.
    Attempting(usize),
    /// An attempt produced a file.
    Succeeded(DownloadResult),
    /// Every attempt failed; only the last error survives.
    Exhausted(DownloadError),
}

impl FallbackState {
    /// Transition after the attempt at `index` failed with `err`.
    ///
    /// A plan with one attempt exhausts immediately. Otherwise the next
    /// attempt runs until the list is used up.
    pub fn after_failure(index: usize, attempt_count: usize, err: DownloadError) -> Self {
        if index + 1 < attempt_count {
            Self::Attempting(index + 1)
        } else {
            Self::Exhausted(err)
        }
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// The acquisition orchestrator.
///
/// Generic over its three adapters so tests can inject fakes. All three are
/// `Send + Sync`, so one pipeline serves concurrent requests.
pub struct Pipeline<D, P, T> {
    config: CoreConfig,
    downloader: D,
    prober: P,
    transcoder: T,
}

impl<D, P, T> Pipeline<D, P, T>
where
    D: Downloader,
    P: MediaProber,
    T: Transcoder,
{
    pub fn new(config: CoreConfig, downloader: D, prober: P, transcoder: T) -> Self {
        Self {
            config,
            downloader,
            prober,
            transcoder,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Runs one acquisition inside `request.working_dir`.
    ///
    /// Returns exactly one artifact or one terminal error. The caller owns
    /// the working directory and its cleanup; see [`Self::acquire_scoped`].
    pub fn acquire(
        &self,
        request: &AcquisitionRequest,
        cancel: &CancelFlag,
    ) -> Result<Artifact, AcquisitionError> {
        let start = Instant::now();
        let plan = classify(&request.url, &self.config.strategy_order);
        info!(
            "Acquiring {} ({} attempt(s){})",
            request.url,
            plan.attempts.len(),
            plan.platform
                .map(|p| format!(", platform {p}"))
                .unwrap_or_default()
        );

        let (download, attempt_dir) = self.download_with_fallback(request, &plan, cancel)?;
        ensure_not_cancelled(cancel)?;

        let input = resolve_download_path(
            &absolutize(&attempt_dir, &download.file_path),
            &absolutize(&attempt_dir, Path::new(&download.declared_filename)).to_string_lossy(),
            self.config.target_extension(),
        );
        let downloaded = validate_artifact(&input)?;
        info!(
            "Downloaded {} ({})",
            display_name(&downloaded.path),
            format_bytes(downloaded.size_bytes)
        );

        ensure_not_cancelled(cancel)?;
        let props = match self.prober.probe(&input) {
            Some(props) => props,
            None => {
                warn!(
                    "Could not probe {}; assuming nothing about it",
                    display_name(&input)
                );
                Default::default()
            }
        };

        let transcode_plan = decide(&props, &self.config.decision);
        info!(
            "Plan for {}: {} ({})",
            display_name(&input),
            transcode_plan.kind,
            transcode_plan.reason
        );

        ensure_not_cancelled(cancel)?;
        let timeout = self.config.transcode_timeouts.for_kind(transcode_plan.kind);
        let output = self
            .transcoder
            .run(&input, &transcode_plan, &request.working_dir, timeout, cancel)
            .map_err(|e| {
                if e.kind == TranscodeErrorKind::Cancelled {
                    AcquisitionError::Cancelled
                } else {
                    error!("Transcode of {} failed: {}", display_name(&input), e);
                    AcquisitionError::Transcode(e)
                }
            })?;

        let artifact = validate_artifact(&output).inspect_err(|e| {
            error!("Transcoder output rejected: {e}");
        })?;
        info!(
            "Produced {} ({}) in {:.1}s",
            display_name(&artifact.path),
            format_bytes(artifact.size_bytes),
            start.elapsed().as_secs_f64()
        );
        Ok(artifact)
    }

    /// Drives the fallback state machine over the plan's attempts.
    fn download_with_fallback(
        &self,
        request: &AcquisitionRequest,
        plan: &StrategyPlan,
        cancel: &CancelFlag,
    ) -> Result<(DownloadResult, PathBuf), AcquisitionError> {
        let default_attempts = [StrategyAttempt::default_attempt()];
        let attempts: &[StrategyAttempt] = if plan.attempts.is_empty() {
            &default_attempts
        } else {
            &plan.attempts
        };

        let mut state = FallbackState::Attempting(0);
        let mut attempt_dir = request.working_dir.clone();
        loop {
            match state {
                FallbackState::Attempting(index) => {
                    ensure_not_cancelled(cancel)?;
                    let attempt = &attempts[index];
                    attempt_dir = request.working_dir.join(format!("attempt-{}", index + 1));
                    fs::create_dir_all(&attempt_dir).map_err(AcquisitionError::Workspace)?;

                    let download_request = DownloadRequest {
                        url: request.url.clone(),
                        output_dir: attempt_dir.clone(),
                        platform: plan.platform,
                        strategy: attempt.label.clone(),
                    };

                    state = match self.downloader.download(&download_request, cancel) {
                        Ok(result) => FallbackState::Succeeded(result),
                        Err(err) => {
                            ensure_not_cancelled(cancel)?;
                            let next = FallbackState::after_failure(index, attempts.len(), err.clone());
                            if matches!(next, FallbackState::Attempting(_)) {
                                warn!("{err}; trying next strategy");
                            }
                            next
                        }
                    };
                }
                FallbackState::Succeeded(result) => {
                    debug!("Download finished in {}", attempt_dir.display());
                    return Ok((result, attempt_dir));
                }
                FallbackState::Exhausted(err) => {
                    error!("All download attempts for {} failed: {}", request.url, err);
                    return Err(err.into());
                }
            }
        }
    }

    /// Runs one acquisition in a private scratch directory.
    ///
    /// The directory lives under `temp_root` and is removed on every exit
    /// path, so `consumer` must finish with the artifact (copy it, upload
    /// it) before returning.
    pub fn acquire_scoped<F, R>(
        &self,
        url: &str,
        transport_mode: TransportMode,
        cancel: &CancelFlag,
        consumer: F,
    ) -> Result<R, AcquisitionError>
    where
        F: FnOnce(&Artifact) -> R,
    {
        let workspace = create_request_workspace(self.config.temp_root.as_deref(), WORKSPACE_PREFIX)
            .map_err(workspace_error)?;

        let request = AcquisitionRequest {
            url: url.to_string(),
            working_dir: workspace.path().to_path_buf(),
            transport_mode,
        };

        let result = self.acquire(&request, cancel).map(|artifact| consumer(&artifact));

        let path = workspace.path().to_path_buf();
        if let Err(e) = workspace.close() {
            warn!("Failed to remove working directory {}: {e}", path.display());
        }
        result
    }

    /// Runs independent scoped acquisitions side by side.
    ///
    /// Each URL gets its own working directory and its own result; one
    /// failure never affects another. Results come back in input order.
    /// Parallelism follows the current rayon pool.
    pub fn acquire_batch<S, F, R>(
        &self,
        urls: &[S],
        transport_mode: TransportMode,
        cancel: &CancelFlag,
        consumer: F,
    ) -> Vec<Result<R, AcquisitionError>>
    where
        S: AsRef<str> + Sync,
        F: Fn(&str, &Artifact) -> R + Sync,
        R: Send,
    {
        urls.par_iter()
            .map(|url| {
                let url = url.as_ref();
                self.acquire_scoped(url, transport_mode, cancel, |artifact| consumer(url, artifact))
            })
            .collect()
    }
}

fn ensure_not_cancelled(cancel: &CancelFlag) -> Result<(), AcquisitionError> {
    if cancel.is_cancelled() {
        info!("Acquisition cancelled");
        Err(AcquisitionError::Cancelled)
    } else {
        Ok(())
    }
}

fn absolutize(dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

fn workspace_error(err: CoreError) -> AcquisitionError {
    match err {
        CoreError::Io(e) => AcquisitionError::Workspace(e),
        other => AcquisitionError::Workspace(io::Error::other(other.to_string())),
    }
}
