// reelfix-cli/src/urls.rs
//
// Pulls http(s) URLs out of free text. A URL runs until the next whitespace;
// no further validation happens here, the pipeline rejects what it cannot
// download.

use regex::Regex;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// Returns every URL in `text`, first occurrence order, duplicates removed.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for found in URL_RE.find_iter(text) {
        let url = found.as_str();
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }
    urls
}
