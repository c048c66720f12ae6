//! Process plumbing shared by the external tool adapters.

pub mod command;

pub use command::{CancelFlag, CommandError, CommandOutput, run_command};
