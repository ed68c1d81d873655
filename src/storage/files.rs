use std::{
    io,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::domain::FileSystem;

/// The local filesystem, with relative paths resolved against a base
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFiles {
    base: PathBuf,
}

impl LocalFiles {
    /// Resolves relative paths against `base`.
    #[must_use]
    pub const fn new(base: PathBuf) -> Self {
        Self { base }
    }
}

impl FileSystem for LocalFiles {
    /// Only regular files count. An empty path would otherwise resolve to the
    /// base directory itself.
    fn exists(&self, path: &Path) -> bool {
        !path.as_os_str().is_empty() && self.base.join(path).is_file()
    }
}

/// Recursively copies the directory `from` into `to`, creating `to` and any
/// intermediate directories. Existing files are overwritten.
///
/// Returns the number of files copied.
///
/// # Errors
///
/// Returns an error if `from` cannot be walked or a file cannot be copied.
pub fn copy_assets(from: &Path, to: &Path) -> io::Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    tracing::debug!(
        "Copied {copied} files from {} to {}",
        from.display(),
        to.display()
    );
    Ok(copied)
}
