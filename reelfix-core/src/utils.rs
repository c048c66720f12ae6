//! Utility functions for formatting and diagnostics.
//!
//! General-purpose helpers used throughout the reelfix-core library.

use std::path::Path;

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use] pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Keeps the last `limit` characters of tool output, trimmed.
///
/// Tools print the useful part of a failure at the end, so the head is
/// dropped. Cuts on a char boundary and marks the cut with a leading `...`.
#[must_use] pub fn truncate_diagnostic(text: &str, limit: usize) -> String {
    let trimmed = text.trim();
    let count = trimmed.chars().count();
    if count <= limit {
        return trimmed.to_string();
    }

    let skip = count - limit;
    let start = trimmed
        .char_indices()
        .nth(skip)
        .map_or(trimmed.len(), |(idx, _)| idx);
    format!("...{}", &trimmed[start..])
}

/// File name for logs and messages, falling back to the full path.
#[must_use] pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
