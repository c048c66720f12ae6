// reelfix-cli/src/cli.rs
//
// Defines the command-line argument structures using clap. Every option that
// shapes the pipeline can also come from the environment, so a deployment can
// be configured without touching the command line.

use clap::{Args, Parser, Subcommand};
use reelfix_core::config::{TranscodeMode, TransportMode};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Reelfix: fetch remote videos and make them play everywhere",
    long_about = "Downloads media with yt-dlp, probes it with ffprobe and remuxes or \
                  re-encodes it with ffmpeg so it is ready to forward."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write a timestamped log file into this directory
    #[arg(long, global = true, value_name = "LOG_DIR", env = "REELFIX_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every URL found in the given text and deliver the results
    Fetch(FetchArgs),
    /// Show what the decision engine would do with a local file
    Plan(PlanArgs),
    /// Verify that yt-dlp, ffmpeg and ffprobe are runnable
    Check(CheckArgs),
}

/// Locations of the external tools. Unset means: search PATH, then /usr/local/bin.
#[derive(Args, Debug, Clone, Default)]
pub struct ToolArgs {
    /// Path to the yt-dlp binary
    #[arg(long, value_name = "PATH", env = "REELFIX_YTDLP")]
    pub ytdlp: Option<PathBuf>,

    /// Path to the ffmpeg binary
    #[arg(long, value_name = "PATH", env = "REELFIX_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long, value_name = "PATH", env = "REELFIX_FFPROBE")]
    pub ffprobe: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Text containing one or more http(s) URLs
    #[arg(required = true, value_name = "TEXT")]
    pub text: Vec<String>,

    /// Directory delivered files are copied into
    #[arg(short, long = "output", value_name = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Maximum number of URLs processed at once (default: number of CPUs)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// yt-dlp format selector
    #[arg(long = "format", value_name = "SELECTOR", env = "YTDLP_FORMAT")]
    pub format_selector: Option<String>,

    /// Netscape cookie file; copied per request, never modified
    #[arg(long, value_name = "FILE", env = "YTDLP_COOKIES_FILE")]
    pub cookies: Option<PathBuf>,

    /// User-Agent header sent by yt-dlp
    #[arg(long, value_name = "UA", env = "YTDLP_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Comma-separated extraction strategies for multi-strategy sites
    #[arg(
        long,
        value_name = "LABELS",
        value_delimiter = ',',
        env = "YTDLP_TWITTER_API_ORDER"
    )]
    pub strategy_order: Vec<String>,

    /// Transcode mode: auto, passthrough-only or compatibility
    #[arg(long, value_name = "MODE", default_value = "auto", env = "REELFIX_TRANSCODE_MODE")]
    pub mode: TranscodeMode,

    /// Transport the files go out on: hosted (50MB) or local (2000MB)
    #[arg(long, value_name = "TRANSPORT", default_value = "hosted", env = "REELFIX_TRANSPORT")]
    pub transport: TransportMode,

    /// Parent directory for per-request scratch space
    #[arg(long, value_name = "DIR", env = "REELFIX_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// JavaScript runtime for yt-dlp, e.g. deno:/usr/local/bin/deno
    #[arg(long, value_name = "RUNTIME", env = "REELFIX_JS_RUNTIME")]
    pub js_runtime: Option<String>,

    #[command(flatten)]
    pub tools: ToolArgs,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Local media file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Transcode mode to decide under
    #[arg(long, value_name = "MODE", default_value = "auto", env = "REELFIX_TRANSCODE_MODE")]
    pub mode: TranscodeMode,

    #[command(flatten)]
    pub tools: ToolArgs,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub tools: ToolArgs,
}
