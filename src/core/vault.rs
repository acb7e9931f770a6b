//! Vault manager.
//!
//! The primary interface for all vault operations: lifecycle, entry CRUD,
//! search, and whole-file sync against a remote blob store.
//!
//! A manager is an explicit session object bound to exactly one store; the
//! caller constructs it and passes it into every operation. The session is
//! a tagged state, `Closed` or `Open { crypto, vault }`, so use-after-close
//! and double-open are impossible to express without an error.
//!
//! Single-threaded by design: every operation, including storage I/O, runs
//! on the caller's thread to completion. No file locking is taken;
//! concurrent access to the same vault path from multiple processes is
//! unsupported.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::core::crypto::{self, CryptoEngine};
use crate::core::store::BlobStore;
use crate::core::types::{Entry, EntryUpdate, Vault, VaultInfo};
use crate::error::{Result, VaultError};

enum Session {
    Closed,
    Open { crypto: CryptoEngine, vault: Vault },
}

/// Vault lifecycle, CRUD, and sync operations over one blob store.
pub struct Manager {
    store: Box<dyn BlobStore>,
    session: Session,
}

impl Manager {
    /// Create a manager bound to a store, starting Closed.
    pub fn new(store: Box<dyn BlobStore>) -> Self {
        Self {
            store,
            session: Session::Closed,
        }
    }

    /// Whether a vault is currently open.
    pub fn is_open(&self) -> bool {
        matches!(self.session, Session::Open { .. })
    }

    fn open_ref(&self) -> Result<(&CryptoEngine, &Vault)> {
        match &self.session {
            Session::Open { crypto, vault } => Ok((crypto, vault)),
            Session::Closed => Err(VaultError::NotOpen.into()),
        }
    }

    // --- Lifecycle ---

    /// Initialize a new vault on an empty store.
    ///
    /// Generates a fresh salt, derives a key from the master password,
    /// persists an empty vault stamped with that salt, and leaves the
    /// session Open.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::AlreadyOpen` from Open state and
    /// `VaultError::VaultExists` if the store already holds a vault.
    pub fn init(&mut self, master_password: &str) -> Result<()> {
        if self.is_open() {
            return Err(VaultError::AlreadyOpen.into());
        }
        if self.store.exists() {
            return Err(VaultError::VaultExists.into());
        }

        let salt = crypto::generate_salt();
        let crypto = CryptoEngine::derive(master_password, &salt)?;
        let vault = Vault::new(BASE64.encode(salt));

        self.session = Session::Open { crypto, vault };
        self.persist()?;

        info!("initialized new vault");
        Ok(())
    }

    /// Open an existing vault.
    ///
    /// Reads and parses the stored bytes, verifies the checksum, and
    /// derives a key from the supplied password and the vault's stored
    /// salt. No correctness check is performed on the derived key here: a
    /// wrong master password is accepted silently and surfaces as
    /// `DecryptionFailed` on the first attempted decryption. This is
    /// documented observable behavior.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::AlreadyOpen` from Open state, storage errors
    /// unchanged, and `VaultError::Corrupted` on malformed structure,
    /// malformed salt encoding, or checksum mismatch.
    pub fn open(&mut self, master_password: &str) -> Result<()> {
        if self.is_open() {
            return Err(VaultError::AlreadyOpen.into());
        }

        let data = self.store.read()?;
        let (vault, salt) = decode_vault(&data)?;
        let crypto = CryptoEngine::derive(master_password, &salt)?;

        debug!(entries = vault.entries.len(), "vault opened");
        self.session = Session::Open { crypto, vault };
        Ok(())
    }

    /// Close the vault: zero key material, discard the decrypted
    /// structure, return to Closed. Idempotent.
    pub fn close(&mut self) {
        // Dropping the session zeroizes the key.
        self.session = Session::Closed;
        debug!("vault closed");
    }

    /// Summary of the open vault, or `None` when closed.
    pub fn info(&self) -> Option<VaultInfo> {
        match &self.session {
            Session::Open { vault, .. } => Some(VaultInfo {
                version: vault.version.clone(),
                entries: vault.entries.len(),
                created_at: vault.created_at,
                updated_at: vault.updated_at,
            }),
            Session::Closed => None,
        }
    }

    // --- Entries ---

    /// Add a new entry.
    ///
    /// The password is always encrypted; notes are encrypted only when
    /// non-empty (empty notes persist as an empty, unencrypted string).
    /// The vault is re-persisted immediately.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::EntryExists` on an exact case-sensitive name
    /// collision.
    pub fn add_entry(
        &mut self,
        name: &str,
        username: &str,
        password: &str,
        url: &str,
        notes: &str,
        tags: Vec<String>,
    ) -> Result<Entry> {
        let Session::Open { crypto, vault } = &mut self.session else {
            return Err(VaultError::NotOpen.into());
        };
        if vault.entry(name).is_some() {
            return Err(VaultError::EntryExists(name.to_string()).into());
        }

        let mut entry = Entry::new(name);
        entry.username = username.to_string();
        entry.password = crypto.encrypt_str(password)?;
        entry.url = url.to_string();
        if !notes.is_empty() {
            entry.notes = crypto.encrypt_str(notes)?;
        }
        entry.tags = tags;

        vault.entries.push(entry.clone());
        self.persist()?;

        debug!(name, "entry added");
        Ok(entry)
    }

    /// Get an entry by name with ciphertext fields untouched.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::EntryNotFound` if absent.
    pub fn get_entry(&self, name: &str) -> Result<Entry> {
        let (_, vault) = self.open_ref()?;
        vault
            .entry(name)
            .cloned()
            .ok_or_else(|| VaultError::EntryNotFound(name.to_string()).into())
    }

    /// Decrypt an entry's password on demand.
    ///
    /// The plaintext is returned in zeroizing memory and never cached.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::EntryNotFound` if absent and
    /// `CryptoError::DecryptionFailed` under a wrong session key.
    pub fn get_decrypted_password(&self, name: &str) -> Result<Zeroizing<String>> {
        let (crypto, vault) = self.open_ref()?;
        let entry = vault
            .entry(name)
            .ok_or_else(|| VaultError::EntryNotFound(name.to_string()))?;

        crypto.decrypt_str(&entry.password)
    }

    /// Decrypt an entry's notes on demand.
    ///
    /// Empty notes are the unencrypted-empty marker and return `""`
    /// without a decrypt call.
    ///
    /// # Errors
    ///
    /// Same as [`Manager::get_decrypted_password`].
    pub fn get_decrypted_notes(&self, name: &str) -> Result<Zeroizing<String>> {
        let (crypto, vault) = self.open_ref()?;
        let entry = vault
            .entry(name)
            .ok_or_else(|| VaultError::EntryNotFound(name.to_string()))?;

        if entry.notes.is_empty() {
            return Ok(Zeroizing::new(String::new()));
        }
        crypto.decrypt_str(&entry.notes)
    }

    /// List all entries in insertion order.
    pub fn list_entries(&self) -> Result<Vec<Entry>> {
        let (_, vault) = self.open_ref()?;
        Ok(vault.entries.clone())
    }

    /// Apply a sparse update to an entry and re-persist.
    ///
    /// Only `Some` fields are applied. An empty notes string clears to the
    /// unencrypted-empty state; a new password is re-encrypted with a
    /// fresh nonce under the current session key. `updated_at` is
    /// refreshed.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::EntryNotFound` if absent.
    pub fn update_entry(&mut self, name: &str, updates: EntryUpdate) -> Result<Entry> {
        let Session::Open { crypto, vault } = &mut self.session else {
            return Err(VaultError::NotOpen.into());
        };
        let Some(entry) = vault.entry_mut(name) else {
            return Err(VaultError::EntryNotFound(name.to_string()).into());
        };

        if let Some(username) = updates.username {
            entry.username = username;
        }
        if let Some(password) = updates.password {
            entry.password = crypto.encrypt_str(&password)?;
        }
        if let Some(url) = updates.url {
            entry.url = url;
        }
        if let Some(notes) = updates.notes {
            entry.notes = if notes.is_empty() {
                String::new()
            } else {
                crypto.encrypt_str(&notes)?
            };
        }

        entry.updated_at = Utc::now();
        let updated = entry.clone();
        self.persist()?;

        debug!(name, "entry updated");
        Ok(updated)
    }

    /// Delete an entry and re-persist.
    ///
    /// Deleting and re-adding the same name is permitted; uniqueness is
    /// enforced only among entries currently present.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::EntryNotFound` if absent.
    pub fn delete_entry(&mut self, name: &str) -> Result<()> {
        let Session::Open { vault, .. } = &mut self.session else {
            return Err(VaultError::NotOpen.into());
        };
        let Some(index) = vault.entry_index(name) else {
            return Err(VaultError::EntryNotFound(name.to_string()).into());
        };

        vault.entries.remove(index);
        self.persist()?;

        debug!(name, "entry deleted");
        Ok(())
    }

    /// Case-insensitive substring search over name, username, url, and
    /// each tag.
    ///
    /// An entry matching on several fields appears exactly once; result
    /// order preserves vault order, not match relevance.
    pub fn search_entries(&self, query: &str) -> Result<Vec<Entry>> {
        let (_, vault) = self.open_ref()?;
        let query = query.to_lowercase();

        Ok(vault
            .entries
            .iter()
            .filter(|e| {
                e.name.to_lowercase().contains(&query)
                    || e.username.to_lowercase().contains(&query)
                    || e.url.to_lowercase().contains(&query)
                    || e.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .cloned()
            .collect())
    }

    /// Generate a random alphanumeric password.
    pub fn generate_password(&self, length: usize) -> String {
        crypto::generate_password(length)
    }

    // --- Sync ---

    /// Push: write the open vault wholesale to a remote store, exactly as
    /// it would be persisted locally.
    ///
    /// Unconditional last-writer-wins overwrite; no merge or conflict
    /// detection. Two parties alternately pushing from independent local
    /// copies will silently discard one another's changes.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotOpen` from Closed; remote storage errors
    /// pass through unchanged.
    pub fn sync(&self, remote: &dyn BlobStore) -> Result<()> {
        let (_, vault) = self.open_ref()?;
        let data = persisted_bytes(vault)?;
        remote.write(&data)?;

        info!(kind = %remote.kind(), "vault pushed to remote");
        Ok(())
    }

    /// Pull: read the remote vault and replace the entire local session
    /// state with it, deriving a key from the supplied master password and
    /// the remote vault's embedded salt.
    ///
    /// Any open session is closed first; any local-only changes since the
    /// last push are lost unconditionally. Confirmation belongs to the
    /// interactive layer, not here.
    ///
    /// # Errors
    ///
    /// Remote storage errors pass through unchanged;
    /// `VaultError::Corrupted` on malformed remote content.
    pub fn pull(&mut self, remote: &dyn BlobStore, master_password: &str) -> Result<()> {
        let data = remote.read()?;
        let (vault, salt) = decode_vault(&data)?;
        let crypto = CryptoEngine::derive(master_password, &salt)?;

        // Replacing the session zeroizes any previous key.
        self.session = Session::Open { crypto, vault };

        info!(kind = %remote.kind(), "vault pulled from remote");
        Ok(())
    }

    // --- Persistence ---

    /// Canonical persist: stamp `updated_at`, checksum the canonical
    /// encoding with the checksum field blanked, re-serialize with the
    /// checksum set, write atomically.
    fn persist(&mut self) -> Result<()> {
        let Session::Open { vault, .. } = &mut self.session else {
            return Err(VaultError::NotOpen.into());
        };

        vault.updated_at = Utc::now();
        let canonical = vault.canonical_bytes()?;
        vault.checksum = crypto::checksum(&canonical);

        let data = persisted_bytes(vault)?;
        self.store.write(&data)
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("store", &self.store.kind())
            .field("open", &self.is_open())
            .finish()
    }
}

/// Serialize a vault in its persisted form, checksum included.
fn persisted_bytes(vault: &Vault) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(vault).map_err(|e| VaultError::Corrupted(format!("encode: {e}")).into())
}

/// Parse persisted bytes into a vault plus its decoded salt, verifying
/// structure, salt encoding, and checksum.
fn decode_vault(data: &[u8]) -> Result<(Vault, Vec<u8>)> {
    let vault: Vault = serde_json::from_slice(data)
        .map_err(|e| VaultError::Corrupted(format!("malformed vault: {e}")))?;

    let salt = BASE64
        .decode(&vault.salt)
        .map_err(|_| VaultError::Corrupted("malformed salt encoding".to_string()))?;

    let canonical = vault.canonical_bytes()?;
    if !crypto::verify_checksum(&canonical, &vault.checksum) {
        return Err(VaultError::Corrupted("checksum mismatch".to_string()).into());
    }

    Ok((vault, salt))
}
