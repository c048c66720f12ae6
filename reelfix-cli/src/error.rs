// ============================================================================
// reelfix-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Context helpers on top of reelfix-core errors
//
// The CLI has no error enum of its own. Front-end failures are folded into
// CoreError::OperationFailed with a short context prefix so main() has a
// single type to report.
//
// KEY COMPONENTS:
// - CliResult: Result alias for command handlers
// - CliErrorContext: `.cli_context(..)` for Results and Options
// - cli_error!: format a one-off OperationFailed

// ---- Internal crate imports ----
use reelfix_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;

/// Result type for command handlers.
pub type CliResult<T> = CoreResult<T>;

/// Attaches a context prefix to an error, or turns a `None` into one.
pub trait CliErrorContext<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Lazy variant of [`CliErrorContext::cli_context`].
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| CoreError::OperationFailed(format!("{}: {}", context, e.into())))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| CoreError::OperationFailed(format!("{}: {}", f(), e.into())))
    }
}

impl<T> CliErrorContext<T> for Option<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.ok_or_else(|| CoreError::OperationFailed(context.to_string()))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| CoreError::OperationFailed(f().to_string()))
    }
}

/// Builds a `CoreError::OperationFailed` from format arguments.
#[macro_export]
macro_rules! cli_error {
    ($($arg:tt)*) => {
        $crate::reelfix_core::CoreError::OperationFailed(format!($($arg)*))
    };
}
