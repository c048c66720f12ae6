//! Downloaded path normalization.
//!
//! The downloader reports the filename it intended to write, but a merge or
//! remux step may have swapped the extension afterwards. This finds the file
//! that actually exists.

use log::debug;
use std::path::{Path, PathBuf};

/// Returns the path the downloaded file actually lives at.
///
/// If `declared` already has `target_ext`, or exists, it is returned as is.
/// Otherwise the sibling with `target_ext` is returned when it exists. When
/// neither exists the declared path comes back unchanged and the validator
/// reports it missing.
pub fn normalize_download_path(declared: &Path, target_ext: &str) -> PathBuf {
    let target_ext = target_ext.trim_start_matches('.');
    let has_target_ext = declared
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(target_ext));

    if has_target_ext || declared.exists() {
        return declared.to_path_buf();
    }

    let sibling = declared.with_extension(target_ext);
    if sibling.exists() {
        debug!(
            "Declared file {} was remuxed to {}",
            declared.display(),
            sibling.display()
        );
        return sibling;
    }

    declared.to_path_buf()
}

/// Picks the input for the rest of the pipeline.
///
/// The adapter's reported final path wins when it names an existing file;
/// otherwise the declared filename is normalized against `target_ext`.
pub fn resolve_download_path(
    final_path: &Path,
    declared_filename: &str,
    target_ext: &str,
) -> PathBuf {
    if final_path.is_file() {
        return final_path.to_path_buf();
    }
    normalize_download_path(Path::new(declared_filename), target_ext)
}
