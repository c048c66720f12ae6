// reelfix-cli/src/config.rs
//
// Turns parsed CLI arguments into a reelfix-core CoreConfig. Tool paths are
// resolved here once so every worker sees the same binaries.

use log::{debug, warn};
use reelfix_core::config::{CoreConfig, CoreConfigBuilder};
use reelfix_core::resolve_tool;
use std::path::{Path, PathBuf};

use crate::cli::{FetchArgs, ToolArgs};
use crate::error::CliResult;

/// Deno install location picked up automatically when no runtime is given.
pub const DEFAULT_DENO_PATH: &str = "/usr/local/bin/deno";

/// Binaries the pipeline shells out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTools {
    pub ytdlp: PathBuf,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ResolvedTools {
    pub fn resolve(args: &ToolArgs) -> Self {
        Self {
            ytdlp: resolve_tool(args.ytdlp.as_deref(), "yt-dlp"),
            ffmpeg: resolve_tool(args.ffmpeg.as_deref(), "ffmpeg"),
            ffprobe: resolve_tool(args.ffprobe.as_deref(), "ffprobe"),
        }
    }
}

/// Explicit runtime wins; otherwise deno at `deno_path` if it exists.
pub fn js_runtime_arg(explicit: Option<&str>, deno_path: &Path) -> Option<String> {
    match explicit {
        Some(runtime) if !runtime.trim().is_empty() => Some(runtime.trim().to_string()),
        _ if deno_path.is_file() => Some(format!("deno:{}", deno_path.display())),
        _ => None,
    }
}

/// Builds the core configuration for a `fetch` run.
pub fn build_core_config(args: &FetchArgs) -> CliResult<CoreConfig> {
    let tools = ResolvedTools::resolve(&args.tools);
    debug!("Resolved tools: {:?}", tools);

    let mut builder = CoreConfigBuilder::new()
        .transcode_mode(args.mode)
        .strategy_order(args.strategy_order.iter().cloned())
        .ytdlp_path(tools.ytdlp)
        .ffmpeg_path(tools.ffmpeg)
        .ffprobe_path(tools.ffprobe);

    if let Some(dir) = &args.temp_dir {
        builder = builder.temp_root(dir.clone());
    }
    if let Some(selector) = &args.format_selector {
        builder = builder.format_selector(selector.clone());
    }
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    if let Some(cookies) = &args.cookies {
        if cookies.is_file() {
            builder = builder.cookies_path(cookies.clone());
        } else {
            warn!("Cookie file {} not found; continuing without cookies", cookies.display());
        }
    }
    if let Some(runtime) = js_runtime_arg(args.js_runtime.as_deref(), Path::new(DEFAULT_DENO_PATH))
    {
        builder = builder.js_runtime(runtime);
    }

    builder.build()
}
