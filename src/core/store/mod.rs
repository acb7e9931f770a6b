//! Blob storage abstraction.
//!
//! The vault manager and the sync protocol depend only on the [`BlobStore`]
//! contract: a single byte-addressed object with read/write/exists/delete.
//! The local-file backend lives here; remote backends (e.g. WebDAV) are
//! external collaborators implementing the same trait, with the remote
//! protocol's own single-object atomicity standing in for the local
//! rename trick.

mod local;

pub use local::LocalStore;

use crate::core::config::{Config, StorageKind};
use crate::error::{ConfigError, Result};

/// Contract required from any storage collaborator.
///
/// `write` must be atomic: after any interruption the store contains either
/// the fully-old or fully-new content, never a partial write. No timeout or
/// cancellation primitive is defined here; callers needing deadlines wrap
/// these calls externally.
pub trait BlobStore {
    /// Read the stored bytes. `StoreError::NotFound` when absent.
    fn read(&self) -> Result<Vec<u8>>;

    /// Replace the stored bytes atomically.
    fn write(&self, data: &[u8]) -> Result<()>;

    /// Whether the blob currently exists.
    fn exists(&self) -> bool;

    /// Delete the blob. `StoreError::NotFound` when absent.
    fn delete(&self) -> Result<()>;

    /// The backend kind, for diagnostics.
    fn kind(&self) -> StorageKind;
}

impl std::fmt::Debug for dyn BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStore").field("kind", &self.kind()).finish()
    }
}

/// Build the store selected by a config.
///
/// Only the local backend is constructed here. For `webdav` the caller must
/// supply its own [`BlobStore`] implementation; the wire protocol is not
/// part of this crate.
///
/// # Errors
///
/// Returns `ConfigError::ExternalBackend` for storage kinds implemented
/// outside this crate.
pub fn from_config(config: &Config) -> Result<Box<dyn BlobStore>> {
    match config.default_storage {
        StorageKind::Local => Ok(Box::new(LocalStore::new(&config.vault_path))),
        StorageKind::Webdav => Err(ConfigError::ExternalBackend("webdav").into()),
    }
}
