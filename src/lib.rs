//! Warren - an encrypted credential vault core.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── error            # Grouped error types and Result alias
//! └── core/            # Core library components
//!     ├── constants    # Format constants (KDF params, lengths, paths)
//!     ├── crypto       # Argon2id KDF + AES-256-GCM field encryption
//!     ├── types        # Entry / Vault data model (JSON on disk)
//!     ├── config       # config.json management
//!     ├── store/       # Blob storage backends
//!     │   ├── mod      # BlobStore trait
//!     │   └── local    # Atomic local-file implementation
//!     └── vault        # Manager: lifecycle, CRUD, search, sync
//! ```
//!
//! # Features
//!
//! - Argon2id key derivation from a master password
//! - Per-field AES-256-GCM encryption with fresh random nonces
//! - SHA-256 checksum over a canonical vault encoding
//! - Atomic local persistence (write-temp-then-rename)
//! - Whole-file push/pull sync against any [`BlobStore`]
//!
//! The interactive layer (CLI, prompting, clipboard, rendering) and remote
//! transport implementations are external consumers of this crate.

pub mod core;
pub mod error;

pub use crate::core::config::{Config, StorageKind, WebDavConfig};
pub use crate::core::crypto::CryptoEngine;
pub use crate::core::store::{BlobStore, LocalStore};
pub use crate::core::types::{Entry, EntryUpdate, Vault, VaultInfo};
pub use crate::core::vault::Manager;
pub use crate::error::{
    ConfigError, CryptoError, Error, Result, StoreError, VaultError,
};
