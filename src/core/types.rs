//! Vault data model.
//!
//! The serialized shapes here are the on-disk format: a vault is a JSON
//! object holding its KDF salt, a SHA-256 checksum over its canonical
//! encoding, and an ordered list of entries whose `password` and non-empty
//! `notes` fields are AEAD ciphertext (`base64(nonce || seal)`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::constants::VAULT_VERSION;
use crate::error::{Result, VaultError};

/// A single credential entry.
///
/// `password` always holds ciphertext; `notes` holds ciphertext when
/// non-empty and the empty string otherwise (emptiness itself is not
/// treated as sensitive). All other fields are plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Random 128-bit identifier, immutable and unique within a vault.
    pub id: Uuid,
    /// Unique key within the vault; exact case-sensitive match.
    pub name: String,
    pub username: String,
    /// AES-256-GCM ciphertext, base64 encoded.
    pub password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Ciphertext when non-empty, empty string otherwise.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ordered tag list; semantically a set but not deduplicated or
    /// sorted by the store.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Entry {
    /// Create an empty entry with a fresh id and current timestamps.
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            username: String::new(),
            password: String::new(),
            url: String::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
        }
    }
}

/// Sparse entry update: only `Some` fields are applied.
///
/// Setting `notes` to an empty string clears it to the unencrypted-empty
/// state; a new `password` is re-encrypted with a fresh nonce.
#[derive(Debug, Default, Clone)]
pub struct EntryUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

/// The whole vault structure as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vault {
    pub version: String,
    /// 16 random bytes, base64. Generated once at creation and immutable
    /// for the vault's lifetime; changing it invalidates every derived key.
    pub salt: String,
    /// `base64(SHA-256)` over the canonical encoding with this field
    /// blanked. Recomputed immediately before every persisted write.
    pub checksum: String,
    /// Insertion order preserved; no implicit sorting.
    pub entries: Vec<Entry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Open string map reserved for future extensions. A `BTreeMap` keeps
    /// the canonical encoding deterministic.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Vault {
    /// Create an empty vault stamped with the given base64 salt.
    pub fn new(salt: String) -> Self {
        let now = Utc::now();
        Self {
            version: VAULT_VERSION.to_string(),
            salt,
            checksum: String::new(),
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
            metadata: BTreeMap::new(),
        }
    }

    /// Canonical encoding: pretty JSON in declared field order with the
    /// checksum field blanked. The checksum protects exactly these bytes,
    /// so the encoding must stay deterministic.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Corrupted` if the vault cannot be encoded.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        let mut blanked = self.clone();
        blanked.checksum.clear();
        serde_json::to_vec_pretty(&blanked)
            .map_err(|e| VaultError::Corrupted(format!("encode: {e}")).into())
    }

    /// Find an entry by exact case-sensitive name.
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub(crate) fn entry_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    pub(crate) fn entry_index(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}

/// Summary of an open vault.
#[derive(Debug, Clone, Serialize)]
pub struct VaultInfo {
    pub version: String,
    pub entries: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
