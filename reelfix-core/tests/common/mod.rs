// reelfix-core/tests/common/mod.rs
//
// Fake adapters for driving the pipeline without yt-dlp, ffprobe or ffmpeg.
// They write real files into the directories the pipeline hands them, so
// path resolution, validation and cleanup run for real.

#![allow(dead_code)]

use reelfix_core::config::{CoreConfig, CoreConfigBuilder};
use reelfix_core::error::{DownloadError, TranscodeError, TranscodeErrorKind};
use reelfix_core::external::ffmpeg_builder::output_path_for;
use reelfix_core::{
    CancelFlag, DownloadRequest, DownloadResult, Downloader, MediaProber, MediaProperties,
    Pipeline, TranscodePlan, Transcoder,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake downloader does for one strategy label.
#[derive(Debug, Clone)]
pub enum DownloadOutcome {
    /// Write `bytes` bytes to `<output_dir>/<file_name>` and report it.
    Write { file_name: String, bytes: usize },
    /// Declare `declared` but actually write the target-extension sibling,
    /// and report no usable final path.
    WriteRemuxed { declared: String, actual: String, bytes: usize },
    /// Report success without writing anything.
    Phantom { file_name: String },
    Fail(String),
    /// Fail and set the shared cancel flag, as if the user hit stop mid-download.
    CancelDuring,
}

#[derive(Clone, Default)]
pub struct FakeDownloader {
    outcomes: Arc<Mutex<HashMap<Option<String>, DownloadOutcome>>>,
    calls: Arc<Mutex<Vec<DownloadRequest>>>,
    cancel: Arc<Mutex<Option<CancelFlag>>>,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, label: Option<&str>, outcome: DownloadOutcome) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(label.map(str::to_string), outcome);
        self
    }

    pub fn cancelling(self, flag: &CancelFlag) -> Self {
        *self.cancel.lock().unwrap() = Some(flag.clone());
        self
    }

    pub fn calls(&self) -> Vec<DownloadRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn labels_tried(&self) -> Vec<Option<String>> {
        self.calls().into_iter().map(|c| c.strategy).collect()
    }
}

impl Downloader for FakeDownloader {
    fn download(
        &self,
        request: &DownloadRequest,
        _cancel: &CancelFlag,
    ) -> Result<DownloadResult, DownloadError> {
        self.calls.lock().unwrap().push(request.clone());
        let strategy = request.strategy.as_deref();
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(&request.strategy)
            .cloned()
            .unwrap_or_else(|| DownloadOutcome::Fail("no scripted outcome".to_string()));

        match outcome {
            DownloadOutcome::Write { file_name, bytes } => {
                let path = request.output_dir.join(&file_name);
                fs::write(&path, vec![0u8; bytes]).unwrap();
                Ok(DownloadResult {
                    file_path: path.clone(),
                    declared_filename: path.to_string_lossy().into_owned(),
                })
            }
            DownloadOutcome::WriteRemuxed { declared, actual, bytes } => {
                fs::write(request.output_dir.join(&actual), vec![0u8; bytes]).unwrap();
                let declared = request.output_dir.join(&declared);
                Ok(DownloadResult {
                    file_path: declared.clone(),
                    declared_filename: declared.to_string_lossy().into_owned(),
                })
            }
            DownloadOutcome::Phantom { file_name } => {
                let path = request.output_dir.join(&file_name);
                Ok(DownloadResult {
                    file_path: path.clone(),
                    declared_filename: path.to_string_lossy().into_owned(),
                })
            }
            DownloadOutcome::Fail(cause) => Err(DownloadError::new(strategy, cause)),
            DownloadOutcome::CancelDuring => {
                if let Some(flag) = self.cancel.lock().unwrap().as_ref() {
                    flag.cancel();
                }
                Err(DownloadError::new(strategy, "interrupted"))
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeProber {
    props: Option<MediaProperties>,
    probed: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeProber {
    pub fn returning(props: Option<MediaProperties>) -> Self {
        Self {
            props,
            probed: Arc::default(),
        }
    }

    pub fn probed(&self) -> Vec<PathBuf> {
        self.probed.lock().unwrap().clone()
    }
}

impl MediaProber for FakeProber {
    fn probe(&self, path: &Path) -> Option<MediaProperties> {
        self.probed.lock().unwrap().push(path.to_path_buf());
        self.props.clone()
    }
}

#[derive(Debug, Clone)]
pub enum TranscodeOutcome {
    /// Write an output of `bytes` bytes.
    Write(usize),
    /// Exit cleanly without producing anything.
    NoOutput,
    Fail(TranscodeErrorKind),
}

/// One recorded transcoder invocation.
#[derive(Debug, Clone)]
pub struct TranscodeCall {
    pub input: PathBuf,
    pub plan: TranscodePlan,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct FakeTranscoder {
    outcome: TranscodeOutcome,
    calls: Arc<Mutex<Vec<TranscodeCall>>>,
}

impl FakeTranscoder {
    pub fn new(outcome: TranscodeOutcome) -> Self {
        Self {
            outcome,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<TranscodeCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transcoder for FakeTranscoder {
    fn run(
        &self,
        input: &Path,
        plan: &TranscodePlan,
        output_dir: &Path,
        timeout: Duration,
        _cancel: &CancelFlag,
    ) -> Result<PathBuf, TranscodeError> {
        self.calls.lock().unwrap().push(TranscodeCall {
            input: input.to_path_buf(),
            plan: plan.clone(),
            timeout,
        });
        let output = output_path_for(input, plan.kind, output_dir, "mp4");
        match &self.outcome {
            TranscodeOutcome::Write(bytes) => {
                fs::write(&output, vec![1u8; *bytes]).unwrap();
                Ok(output)
            }
            TranscodeOutcome::NoOutput => Ok(output),
            TranscodeOutcome::Fail(kind) => Err(TranscodeError::new(*kind, "scripted failure")),
        }
    }
}

pub type FakePipeline = Pipeline<FakeDownloader, FakeProber, FakeTranscoder>;

/// Config with scratch directories under `temp_root`.
pub fn test_config(temp_root: &Path) -> CoreConfig {
    CoreConfigBuilder::new()
        .temp_root(temp_root.to_path_buf())
        .build()
        .unwrap()
}

pub fn pipeline(
    config: CoreConfig,
    downloader: &FakeDownloader,
    prober: &FakeProber,
    transcoder: &FakeTranscoder,
) -> FakePipeline {
    Pipeline::new(config, downloader.clone(), prober.clone(), transcoder.clone())
}

/// Entries left under `dir`.
pub fn leftover_entries(dir: &Path) -> usize {
    fs::read_dir(dir).map(|it| it.count()).unwrap_or(0)
}
