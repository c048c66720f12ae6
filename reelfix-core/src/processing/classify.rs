//! URL classification.
//!
//! Decides from the URL alone how many download attempts a request gets and
//! which extraction strategy each attempt asks for. Never fails: anything
//! unrecognised gets a single default attempt.

use std::fmt;

use url::Url;

use crate::config::DEFAULT_STRATEGY_ORDER;

/// Platforms that expose several interchangeable extraction back-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Twitter,
}

impl Platform {
    /// Extractor key used in yt-dlp's `--extractor-args`.
    pub fn extractor_key(&self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
        }
    }

    fn from_host(host: &str) -> Option<Self> {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);
        match host {
            "twitter.com" | "x.com" | "mobile.twitter.com" | "mobile.x.com" => {
                Some(Self::Twitter)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extractor_key())
    }
}

/// One download attempt. `label: None` means the downloader's default behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyAttempt {
    pub label: Option<String>,
}

impl StrategyAttempt {
    pub fn default_attempt() -> Self {
        Self { label: None }
    }

    pub fn labelled<S: Into<String>>(label: S) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

/// Ordered download attempts for one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyPlan {
    pub platform: Option<Platform>,
    pub attempts: Vec<StrategyAttempt>,
}

impl StrategyPlan {
    pub fn is_single_attempt(&self) -> bool {
        self.attempts.len() <= 1
    }
}

/// Produces the strategy plan for `url`.
///
/// Multi-strategy hosts get one attempt per non-blank label of
/// `strategy_order`, or the built-in order when none is configured.
pub fn classify(url: &str, strategy_order: &[String]) -> StrategyPlan {
    let platform = Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().and_then(Platform::from_host));

    let Some(platform) = platform else {
        return StrategyPlan {
            platform: None,
            attempts: vec![StrategyAttempt::default_attempt()],
        };
    };

    let mut attempts: Vec<StrategyAttempt> = strategy_order
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(StrategyAttempt::labelled)
        .collect();
    if attempts.is_empty() {
        attempts = DEFAULT_STRATEGY_ORDER
            .iter()
            .map(|l| StrategyAttempt::labelled(*l))
            .collect();
    }

    StrategyPlan {
        platform: Some(platform),
        attempts,
    }
}
