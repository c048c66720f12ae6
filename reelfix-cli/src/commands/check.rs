// reelfix-cli/src/commands/check.rs
//
// `reelfix check`: confirm the three external tools start.

use reelfix_core::{CoreError, check_dependency};
use std::path::Path;

use crate::cli::CheckArgs;
use crate::config::ResolvedTools;
use crate::error::CliResult;
use crate::terminal;

/// Result of probing one tool.
#[derive(Debug)]
pub struct ToolStatus {
    pub name: &'static str,
    pub path: String,
    pub error: Option<CoreError>,
}

fn check_tool(name: &'static str, path: &Path, version_arg: &str) -> ToolStatus {
    ToolStatus {
        name,
        path: path.display().to_string(),
        error: check_dependency(path, version_arg).err(),
    }
}

/// Checks every tool; the bool is true when all of them start.
pub fn run_check(args: CheckArgs) -> CliResult<(bool, Vec<ToolStatus>)> {
    let tools = ResolvedTools::resolve(&args.tools);
    let statuses = vec![
        check_tool("yt-dlp", &tools.ytdlp, "--version"),
        check_tool("ffmpeg", &tools.ffmpeg, "-version"),
        check_tool("ffprobe", &tools.ffprobe, "-version"),
    ];

    terminal::print_section("Dependencies");
    for status in &statuses {
        match &status.error {
            None => terminal::print_status(status.name, &format!("ok ({})", status.path), false),
            Some(err) => terminal::print_status(status.name, &format!("MISSING: {err}"), true),
        }
    }

    let all_ok = statuses.iter().all(|s| s.error.is_none());
    if all_ok {
        terminal::print_success("All external tools are available");
    } else {
        terminal::print_warning("Install the missing tools or point to them with --ytdlp/--ffmpeg/--ffprobe");
    }
    Ok((all_ok, statuses))
}
