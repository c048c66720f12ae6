// reelfix-cli/src/lib.rs
//
// Library portion of the reelfix CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod terminal;
pub mod urls;

// Used by the cli_error! macro
pub use reelfix_core;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, FetchArgs};
pub use commands::check::run_check;
pub use commands::fetch::{FetchSummary, run_fetch};
pub use commands::plan::run_plan;
pub use error::{CliErrorContext, CliResult};
