//! Scoped per-request working directories.
//!
//! Every acquisition gets a private directory created through the tempfile
//! crate. Dropping the returned [`TempDir`] removes everything inside it, on
//! success and failure alike.

use crate::error::CoreResult;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, TempDir};

/// Creates a private working directory with `prefix`. Auto-cleaned when dropped.
///
/// With no `temp_root` the system temp directory is used.
pub fn create_request_workspace(temp_root: Option<&Path>, prefix: &str) -> CoreResult<TempDir> {
    let mut builder = TempFileBuilder::new();
    builder.prefix(prefix);

    let dir = match temp_root {
        Some(root) => {
            fs::create_dir_all(root)?;
            builder.tempdir_in(root)?
        }
        None => builder.tempdir()?,
    };
    debug!("Created request workspace {}", dir.path().display());
    Ok(dir)
}

/// Copies the shared cookie file into `dir` and returns the copy's path.
///
/// yt-dlp rewrites its cookie file on exit, so concurrent requests must each
/// get their own copy. Returns `None` if the source is missing or the copy
/// fails; the download then proceeds without cookies.
pub fn stage_cookie_file(source: &Path, dir: &Path) -> Option<PathBuf> {
    if !source.is_file() {
        warn!("Cookie file {} not found, continuing without cookies", source.display());
        return None;
    }

    let staged = dir.join("cookies.txt");
    match fs::copy(source, &staged) {
        Ok(_) => Some(staged),
        Err(e) => {
            warn!("Could not stage cookie file {}: {e}", source.display());
            None
        }
    }
}
