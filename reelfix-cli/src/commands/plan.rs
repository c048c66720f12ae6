// reelfix-cli/src/commands/plan.rs
//
// `reelfix plan FILE`: probe a local file and print the transcode plan the
// pipeline would pick for it, including the ffmpeg invocation. Nothing is
// written.

use log::warn;
use reelfix_core::config::{DEFAULT_PROBE_TIMEOUT, DEFAULT_TARGET_EXTENSION, DecisionConfig};
use reelfix_core::external::ffmpeg_builder::{build_transcode_command, command_args, output_path_for};
use reelfix_core::{FfprobeProber, MediaProber, MediaProperties, TranscodePlan, decide, resolve_tool};
use std::path::Path;

use crate::cli::PlanArgs;
use crate::error::CliResult;
use crate::terminal;

/// Renders a plan's encoder parameters as `key=value` pairs.
pub fn describe_params(plan: &TranscodePlan) -> String {
    if plan.video_codec_params.is_empty() {
        return "copy".to_string();
    }
    plan.video_codec_params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The ffmpeg command line for `plan`, writing next to `input`.
pub fn command_line(input: &Path, plan: &TranscodePlan) -> String {
    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    let output = output_path_for(input, plan.kind, dir, DEFAULT_TARGET_EXTENSION);
    let cmd = build_transcode_command(input, plan, &output);
    let mut line = vec!["ffmpeg".to_string()];
    line.extend(command_args(&cmd));
    line.join(" ")
}

fn print_properties(props: &MediaProperties) {
    terminal::print_status("Resolution", &format!("{}x{}", props.width, props.height), false);
    let sar = props.sar.map_or_else(|| "unknown".to_string(), |s| s.to_string());
    terminal::print_status("SAR", &sar, false);
    terminal::print_status("DAR", props.dar.as_deref().unwrap_or("unknown"), false);
    terminal::print_status("Codec", props.codec.as_deref().unwrap_or("unknown"), false);
}

/// Runs `reelfix plan`.
pub fn run_plan(args: PlanArgs) -> CliResult<TranscodePlan> {
    if !args.file.is_file() {
        return Err(reelfix_core::CoreError::PathError(format!(
            "{} is not a file",
            args.file.display()
        )));
    }

    let ffprobe = resolve_tool(args.tools.ffprobe.as_deref(), "ffprobe");
    let prober = FfprobeProber::new(ffprobe, DEFAULT_PROBE_TIMEOUT);

    terminal::print_section("Media");
    terminal::print_status("File", &args.file.display().to_string(), true);
    let props = match prober.probe(&args.file) {
        Some(props) => {
            print_properties(&props);
            props
        }
        None => {
            warn!("Could not probe {}; deciding with unknown properties", args.file.display());
            terminal::print_warning("Probe failed; the default plan applies");
            MediaProperties::default()
        }
    };

    let plan = decide(&props, &DecisionConfig::with_mode(args.mode));

    terminal::print_section("Plan");
    terminal::print_status("Mode", &args.mode.to_string(), false);
    terminal::print_status("Action", &plan.kind.to_string(), true);
    terminal::print_status("Reason", &plan.reason, false);
    if !plan.filter_chain.is_empty() {
        terminal::print_status("Filters", &plan.filter_chain.join(","), false);
    }
    terminal::print_status("Video", &describe_params(&plan), false);
    terminal::print_status("Command", &command_line(&args.file, &plan), false);

    Ok(plan)
}
