// ============================================================================
// reelfix-core/src/external/ytdlp_executor.rs
// ============================================================================
//
// YT-DLP EXECUTION: The Downloader Adapter
//
// Translates the typed downloader configuration into a yt-dlp command line,
// runs it in the attempt's private directory and reports which file it
// produced. yt-dlp is asked to print two marker lines on stdout: the
// filename it planned before downloading, and the final path after every
// post-processor (merge, remux, move) has run.
//
// KEY COMPONENTS:
// - build_download_args: pure argument construction
// - extract_error_cause: reduces yt-dlp stderr to a bounded, readable cause
// - YtDlpDownloader: the Downloader implementation

use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use super::{DownloadRequest, DownloadResult, Downloader};
use crate::config::{CoreConfig, DownloaderConfig};
use crate::error::DownloadError;
use crate::temp_files::stage_cookie_file;
use crate::util::command::{CancelFlag, CommandError, run_command};
use crate::utils::truncate_diagnostic;

const DECLARED_MARKER: &str = "reelfix-declared=";
const FINAL_MARKER: &str = "reelfix-final=";

// ============================================================================
// ARGUMENT CONSTRUCTION
// ============================================================================

/// Builds the yt-dlp argument list for one attempt.
///
/// `cookie_file` must already be the staged per-request copy. `ffmpeg` is
/// handed over with `--ffmpeg-location` only when it is an absolute path.
pub fn build_download_args(
    request: &DownloadRequest,
    config: &DownloaderConfig,
    target_ext: &str,
    ffmpeg: &Path,
    cookie_file: Option<&Path>,
) -> Vec<String> {
    let template = request.output_dir.join(&config.output_template);
    let mut args: Vec<String> = vec![
        "-f".into(),
        config.format_selector.clone(),
        "--merge-output-format".into(),
        target_ext.to_string(),
        "--remux-video".into(),
        target_ext.to_string(),
        "-o".into(),
        template.to_string_lossy().into_owned(),
        "--no-playlist".into(),
        "--no-progress".into(),
        "--retries".into(),
        config.retries.to_string(),
        "--fragment-retries".into(),
        config.fragment_retries.to_string(),
        "--file-access-retries".into(),
        config.file_access_retries.to_string(),
        "--extractor-retries".into(),
        config.extractor_retries.to_string(),
        "--socket-timeout".into(),
        config.socket_timeout.as_secs().to_string(),
        "--concurrent-fragments".into(),
        config.concurrent_fragments.to_string(),
    ];

    if config.restrict_filenames {
        args.push("--restrict-filenames".into());
    }

    if ffmpeg.is_absolute() {
        args.push("--ffmpeg-location".into());
        args.push(ffmpeg.to_string_lossy().into_owned());
    }

    if let Some(runtime) = &config.js_runtime {
        args.push("--js-runtimes".into());
        args.push(runtime.clone());
    }

    if let Some(cookies) = cookie_file {
        args.push("--cookies".into());
        args.push(cookies.to_string_lossy().into_owned());
    }

    if let (Some(platform), Some(label)) = (request.platform, request.strategy.as_deref()) {
        args.push("--extractor-args".into());
        args.push(format!("{}:api={label}", platform.extractor_key()));
    }

    if let Some(ua) = &config.user_agent {
        args.push("--add-headers".into());
        args.push(format!("User-Agent:{ua}"));
    }

    args.extend([
        "--print".into(),
        format!("video:{DECLARED_MARKER}%(filename)s"),
        "--print".into(),
        format!("after_move:{FINAL_MARKER}%(filepath)s"),
        "--no-simulate".into(),
        "--".into(),
        request.url.clone(),
    ]);

    args
}

// ============================================================================
// OUTPUT PARSING
// ============================================================================

/// Pulls the declared and final paths out of yt-dlp's stdout.
///
/// The last occurrence of each marker wins. A missing final path falls back
/// to the declared filename.
pub fn parse_download_output(stdout: &str) -> Option<DownloadResult> {
    let mut declared = None;
    let mut final_path = None;
    for line in stdout.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(DECLARED_MARKER) {
            declared = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix(FINAL_MARKER) {
            final_path = Some(rest.to_string());
        }
    }

    let declared = declared.filter(|d| !d.is_empty() && d != "NA");
    let final_path = final_path.filter(|f| !f.is_empty() && f != "NA");
    match (declared, final_path) {
        (Some(declared), Some(final_path)) => Some(DownloadResult {
            file_path: PathBuf::from(final_path),
            declared_filename: declared,
        }),
        (Some(declared), None) => Some(DownloadResult {
            file_path: PathBuf::from(&declared),
            declared_filename: declared,
        }),
        (None, Some(final_path)) => Some(DownloadResult {
            declared_filename: final_path.clone(),
            file_path: PathBuf::from(final_path),
        }),
        (None, None) => None,
    }
}

/// Reduces yt-dlp stderr to a single bounded cause.
///
/// Prefers the last `ERROR:` line, which is where yt-dlp states why it gave
/// up; otherwise the tail of stderr.
pub fn extract_error_cause(stderr: &str, limit: usize) -> String {
    let cause = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR:"))
        .map(|l| l.trim_start_matches("ERROR:").trim());

    match cause {
        Some(line) if !line.is_empty() => truncate_diagnostic(line, limit),
        _ => truncate_diagnostic(stderr, limit),
    }
}

// ============================================================================
// ADAPTER
// ============================================================================

/// Downloader adapter backed by the yt-dlp binary.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    ytdlp: PathBuf,
    ffmpeg: PathBuf,
    target_extension: String,
    config: DownloaderConfig,
    diagnostic_limit: usize,
}

impl YtDlpDownloader {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            ytdlp: config.tools.ytdlp.clone(),
            ffmpeg: config.tools.ffmpeg.clone(),
            target_extension: config.target_extension().to_string(),
            config: config.download.clone(),
            diagnostic_limit: config.diagnostic_limit,
        }
    }
}

impl Downloader for YtDlpDownloader {
    fn download(
        &self,
        request: &DownloadRequest,
        cancel: &CancelFlag,
    ) -> Result<DownloadResult, DownloadError> {
        let strategy = request.strategy.as_deref();
        let fail = |cause: String| DownloadError::new(strategy, cause);

        let cookie_file = self
            .config
            .cookies_path
            .as_deref()
            .and_then(|source| stage_cookie_file(source, &request.output_dir));

        let args = build_download_args(
            request,
            &self.config,
            &self.target_extension,
            &self.ffmpeg,
            cookie_file.as_deref(),
        );

        info!(
            "Downloading {} (strategy: {})",
            request.url,
            strategy.unwrap_or("default")
        );

        let mut cmd = Command::new(&self.ytdlp);
        cmd.args(&args).current_dir(&request.output_dir);

        let output = run_command(&mut cmd, self.config.timeout, cancel).map_err(|e| match e {
            CommandError::NotFound(program) => fail(format!("{program} is not installed or not on PATH")),
            other => fail(other.to_string()),
        })?;

        if !output.success() {
            let cause = extract_error_cause(&output.stderr, self.diagnostic_limit);
            let cause = if cause.is_empty() {
                format!("yt-dlp exited with {}", output.status)
            } else {
                cause
            };
            return Err(fail(cause));
        }

        let result = parse_download_output(&output.stdout)
            .ok_or_else(|| fail("yt-dlp did not report an output file".to_string()))?;
        debug!(
            "yt-dlp declared {} and finished at {}",
            result.declared_filename,
            result.file_path.display()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::classify::Platform;

    fn request(strategy: Option<&str>) -> DownloadRequest {
        DownloadRequest {
            url: "https://x.com/u/status/1".to_string(),
            output_dir: PathBuf::from("/work/attempt-1"),
            platform: Some(Platform::Twitter),
            strategy: strategy.map(str::to_string),
        }
    }

    fn value_after(args: &[String], flag: &str) -> Option<String> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1).cloned())
    }

    #[test]
    fn test_labelled_attempt_passes_extractor_args() {
        let args = build_download_args(
            &request(Some("syndication")),
            &DownloaderConfig::default(),
            "mp4",
            Path::new("ffmpeg"),
            None,
        );
        assert_eq!(
            value_after(&args, "--extractor-args").as_deref(),
            Some("twitter:api=syndication")
        );
        assert_eq!(value_after(&args, "-f").as_deref(), Some("bestvideo*+bestaudio/best"));
        assert_eq!(value_after(&args, "--merge-output-format").as_deref(), Some("mp4"));
        assert_eq!(
            value_after(&args, "-o").as_deref(),
            Some("/work/attempt-1/%(title).200B.%(ext)s")
        );
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(args.contains(&"--restrict-filenames".to_string()));
        assert!(!args.contains(&"--ffmpeg-location".to_string()));
        assert!(!args.contains(&"--cookies".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://x.com/u/status/1"));
        assert_eq!(args[args.len() - 2], "--");
    }

    #[test]
    fn test_default_attempt_has_no_extractor_args() {
        let args = build_download_args(
            &request(None),
            &DownloaderConfig::default(),
            "mp4",
            Path::new("/usr/local/bin/ffmpeg"),
            None,
        );
        assert!(!args.contains(&"--extractor-args".to_string()));
        assert_eq!(
            value_after(&args, "--ffmpeg-location").as_deref(),
            Some("/usr/local/bin/ffmpeg")
        );
    }

    #[test]
    fn test_cookies_user_agent_and_js_runtime() {
        let config = DownloaderConfig {
            user_agent: Some("Mozilla/5.0 Test".to_string()),
            js_runtime: Some("deno:/usr/local/bin/deno".to_string()),
            ..DownloaderConfig::default()
        };
        let staged = PathBuf::from("/work/attempt-1/cookies.txt");
        let args = build_download_args(
            &request(None),
            &config,
            "mp4",
            Path::new("ffmpeg"),
            Some(&staged),
        );
        assert_eq!(
            value_after(&args, "--cookies").as_deref(),
            Some("/work/attempt-1/cookies.txt")
        );
        assert_eq!(
            value_after(&args, "--add-headers").as_deref(),
            Some("User-Agent:Mozilla/5.0 Test")
        );
        assert_eq!(
            value_after(&args, "--js-runtimes").as_deref(),
            Some("deno:/usr/local/bin/deno")
        );
    }

    #[test]
    fn test_parse_download_output() {
        let stdout = "\
reelfix-declared=/work/attempt-1/clip.webm
[Merger] Merging formats
reelfix-final=/work/attempt-1/clip.mp4
";
        let result = parse_download_output(stdout).unwrap();
        assert_eq!(result.declared_filename, "/work/attempt-1/clip.webm");
        assert_eq!(result.file_path, PathBuf::from("/work/attempt-1/clip.mp4"));

        let result = parse_download_output("reelfix-declared=/w/a.mp4\n").unwrap();
        assert_eq!(result.file_path, PathBuf::from("/w/a.mp4"));

        assert_eq!(parse_download_output("[generic] nothing here\n"), None);
        assert_eq!(parse_download_output("reelfix-final=NA\n"), None);
    }

    #[test]
    fn test_extract_error_cause() {
        let stderr = "\
WARNING: [twitter] guest token expired
ERROR: [twitter] 123: Unable to download JSON metadata: HTTP Error 404
ERROR: [twitter] 123: No video could be found in this tweet
";
        assert_eq!(
            extract_error_cause(stderr, 500),
            "[twitter] 123: No video could be found in this tweet"
        );

        let cut = extract_error_cause(&format!("ERROR: {}", "z".repeat(900)), 50);
        assert_eq!(cut.chars().count(), 53);

        assert_eq!(extract_error_cause("Traceback: boom\n", 500), "Traceback: boom");
    }

    #[test]
    fn test_missing_binary_fails_with_strategy() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut config = CoreConfig::default();
        config.tools.ytdlp = PathBuf::from("reelfix-missing-ytdlp");
        let downloader = YtDlpDownloader::from_config(&config);
        let req = DownloadRequest {
            output_dir: dir.path().to_path_buf(),
            ..request(Some("legacy"))
        };
        let err = downloader.download(&req, &CancelFlag::new()).unwrap_err();
        assert_eq!(err.strategy.as_deref(), Some("legacy"));
        assert!(err.cause.contains("not installed"));
        Ok(())
    }
}
