// ============================================================================
// reelfix-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of a CoreConfig. The front-end reads its flags and
// environment once, feeds them through this builder and gets back a
// validated, immutable configuration.
//
// KEY COMPONENTS:
// - CoreConfigBuilder: Builder struct for creating CoreConfig instances
// - build(): assembles the config and runs CoreConfig::validate()

// ---- Standard library imports ----
use std::path::PathBuf;
use std::time::Duration;

// ---- Internal crate imports ----
use super::{CoreConfig, EncodeSettings, TranscodeMode};
use crate::error::CoreResult;

/// Builder for creating CoreConfig instances.
///
/// Every setter is optional; unset values keep the defaults from
/// [`CoreConfig::default`].
///
/// # Examples
///
/// ```rust
/// use reelfix_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .temp_root(PathBuf::from("/tmp/reelfix"))
///     .format_selector("best[height<=720]")
///     .user_agent("Mozilla/5.0")
///     .build()
///     .unwrap();
/// assert_eq!(config.download.format_selector, "best[height<=720]");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parent directory for per-request scratch directories.
    pub fn temp_root(mut self, dir: PathBuf) -> Self {
        self.config.temp_root = Some(dir);
        self
    }

    pub fn target_extension<S: Into<String>>(mut self, ext: S) -> Self {
        self.config.target_extension = ext.into();
        self
    }

    /// Sets the strategy order for multi-strategy platforms.
    ///
    /// Blank labels are dropped. An empty list leaves the built-in order in
    /// place.
    pub fn strategy_order<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Vec<String> = labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if !labels.is_empty() {
            self.config.strategy_order = labels;
        }
        self
    }

    pub fn transcode_mode(mut self, mode: TranscodeMode) -> Self {
        self.config.decision.mode = mode;
        self
    }

    /// Replaces the list of codecs that pass through without re-encoding.
    pub fn compatible_codecs<I, S>(mut self, codecs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.decision.compatible_codecs = codecs.into_iter().map(Into::into).collect();
        self
    }

    pub fn geometry_fix_settings(mut self, settings: EncodeSettings) -> Self {
        self.config.decision.geometry_fix = settings;
        self
    }

    pub fn compatibility_settings(mut self, settings: EncodeSettings) -> Self {
        self.config.decision.compatibility = settings;
        self
    }

    pub fn format_selector<S: Into<String>>(mut self, selector: S) -> Self {
        self.config.download.format_selector = selector.into();
        self
    }

    pub fn output_template<S: Into<String>>(mut self, template: S) -> Self {
        self.config.download.output_template = template.into();
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.download.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the shared cookie file. It is copied per request, never written.
    pub fn cookies_path(mut self, path: PathBuf) -> Self {
        self.config.download.cookies_path = Some(path);
        self
    }

    pub fn js_runtime<S: Into<String>>(mut self, runtime: S) -> Self {
        self.config.download.js_runtime = Some(runtime.into());
        self
    }

    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.config.download.timeout = Some(timeout);
        self
    }

    pub fn ytdlp_path(mut self, path: PathBuf) -> Self {
        self.config.tools.ytdlp = path;
        self
    }

    pub fn ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.config.tools.ffmpeg = path;
        self
    }

    pub fn ffprobe_path(mut self, path: PathBuf) -> Self {
        self.config.tools.ffprobe = path;
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    pub fn diagnostic_limit(mut self, limit: usize) -> Self {
        self.config.diagnostic_limit = limit;
        self
    }

    /// Builds the CoreConfig, rejecting invalid combinations.
    pub fn build(self) -> CoreResult<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
