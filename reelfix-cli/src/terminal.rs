//! Terminal output helpers for the reelfix CLI.
//!
//! Everything goes through the `log` facade so console and log file stay in
//! step. Layout is a small hierarchy: section banners, `»` processing steps,
//! then aligned key/value status lines.

use console::style;
use log::info;
use owo_colors::OwoColorize;
use unicode_width::UnicodeWidthStr;

const STATUS_INDENT: &str = "      ";
const LABEL_WIDTH: usize = 15;

/// Respects the NO_COLOR convention.
fn should_use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a section header for a major phase.
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print a processing step.
pub fn print_processing(message: &str) {
    info!("");
    if should_use_color() {
        info!("  » {}", style(message).bold());
    } else {
        info!("  » {message}");
    }
}

/// Formats a key/value line with the label padded to a fixed display width.
pub fn format_status(label: &str, value: &str) -> String {
    let padding = LABEL_WIDTH.saturating_sub(label.width()).max(1);
    format!("{STATUS_INDENT}{label}:{} {value}", " ".repeat(padding))
}

/// Print a status line; `highlight` renders the value bold.
pub fn print_status(label: &str, value: &str, highlight: bool) {
    if should_use_color() && highlight {
        let bold = style(value).bold().to_string();
        info!("{}", format_status(label, &bold));
    } else {
        info!("{}", format_status(label, value));
    }
}

pub fn print_success(message: &str) {
    if should_use_color() {
        info!("  ✓ {}", message.green());
    } else {
        info!("  ✓ {message}");
    }
}

pub fn print_warning(message: &str) {
    if should_use_color() {
        info!("  ⚠ {}", message.yellow());
    } else {
        info!("  ⚠ {message}");
    }
}

/// Print a failure with its message and an optional hint.
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    if should_use_color() {
        info!("  ✗ {}", title.red().bold());
    } else {
        info!("  ✗ {title}");
    }
    info!("    Message:    {message}");
    if let Some(suggestion) = suggestion {
        info!("    Suggestion: {suggestion}");
    }
}
