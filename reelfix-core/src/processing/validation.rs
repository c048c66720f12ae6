//! Output validation.
//!
//! A file only becomes an [`Artifact`] after it is confirmed to exist as a
//! regular, non-empty file. Used on the downloaded input before transcoding
//! and on the transcoder's output before delivery.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ValidationError;

/// A validated, deliverable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Checks that `path` is a non-empty regular file and returns it as an artifact.
pub fn validate_artifact(path: &Path) -> Result<Artifact, ValidationError> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ValidationError::MissingFile(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ValidationError::Unreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_file() {
        return Err(ValidationError::MissingFile(path.to_path_buf()));
    }

    if metadata.len() == 0 {
        return Err(ValidationError::EmptyFile(path.to_path_buf()));
    }

    Ok(Artifact {
        path: path.to_path_buf(),
        size_bytes: metadata.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.mp4");
        fs::write(&path, vec![0u8; 2048])?;
        let artifact = validate_artifact(&path)?;
        assert_eq!(artifact.size_bytes, 2048);
        assert_eq!(artifact.path, path);
        Ok(())
    }

    #[test]
    fn test_missing_and_empty() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("missing.mp4");
        assert!(matches!(
            validate_artifact(&missing),
            Err(ValidationError::MissingFile(_))
        ));

        let empty = dir.path().join("empty.mp4");
        fs::write(&empty, b"")?;
        assert!(matches!(
            validate_artifact(&empty),
            Err(ValidationError::EmptyFile(_))
        ));
        Ok(())
    }

    #[test]
    fn test_directory_is_not_an_artifact() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        assert!(matches!(
            validate_artifact(dir.path()),
            Err(ValidationError::MissingFile(_))
        ));
        Ok(())
    }
}
