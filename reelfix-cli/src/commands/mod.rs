//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of one subcommand.

/// `reelfix check`: verify the external tools start.
pub mod check;

/// `reelfix fetch`: acquire URLs and deliver the results.
pub mod fetch;

/// `reelfix plan`: show the transcode decision for a local file.
pub mod plan;
