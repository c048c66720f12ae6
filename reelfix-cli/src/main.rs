// reelfix-cli/src/main.rs
//
// Entry point for the `reelfix` binary: parse arguments, install the logger,
// dispatch to the subcommand and turn its outcome into an exit code.
//
// Exit codes:
// - 0: every URL delivered or reported as too large / all tools present
// - 1: at least one URL failed, a tool is missing, or a command error
// - 130: fetch was interrupted by SIGINT or SIGTERM

use clap::Parser;
use log::debug;
use reelfix_cli::commands::{check, fetch, plan};
use reelfix_cli::reelfix_core::CancelFlag;
use reelfix_cli::{Cli, Commands, logging, terminal};
use std::process;

fn main() {
    let cli = Cli::parse();

    match logging::init(cli.verbose, cli.log_dir.as_deref()) {
        Ok(Some(path)) => debug!("Logging to {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }

    let cancel = CancelFlag::new();
    let result = match cli.command {
        Commands::Fetch(args) => {
            fetch::install_interrupt_handler(&cancel);
            fetch::run_fetch(args, &cancel).map(|summary| summary.all_succeeded())
        }
        Commands::Plan(args) => plan::run_plan(args).map(|_| true),
        Commands::Check(args) => check::run_check(args).map(|(all_ok, _)| all_ok),
    };

    if cancel.is_cancelled() {
        process::exit(fetch::INTERRUPTED_EXIT_CODE);
    }

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            terminal::print_error("Command failed", &e.to_string(), None);
            process::exit(1);
        }
    }
}
