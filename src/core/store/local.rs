//! Local-file blob store with atomic writes.
//!
//! Writes land in a `.tmp` sibling first and are renamed into place, so an
//! interrupted write leaves either the old or the new file, never a torn
//! one. Directories are created with mode 0700 and files with 0600 on Unix.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::config::StorageKind;
use crate::core::store::BlobStore;
use crate::error::{Result, StoreError};

/// Blob store backed by a single local file.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(err: io::Error) -> StoreError {
    match err.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound,
        io::ErrorKind::PermissionDenied => StoreError::PermissionDenied,
        _ => StoreError::Io(err),
    }
}

impl BlobStore for LocalStore {
    fn read(&self) -> Result<Vec<u8>> {
        if !self.exists() {
            return Err(StoreError::NotFound.into());
        }
        Ok(fs::read(&self.path).map_err(io_error)?)
    }

    fn write(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                        .map_err(io_error)?;
                }
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, data).map_err(io_error)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600)).map_err(io_error)?;
        }
        fs::rename(&tmp, &self.path).map_err(io_error)?;

        debug!(path = %self.path.display(), bytes = data.len(), "wrote blob");
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn delete(&self) -> Result<()> {
        if !self.exists() {
            return Err(StoreError::NotFound.into());
        }
        Ok(fs::remove_file(&self.path).map_err(io_error)?)
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }
}
