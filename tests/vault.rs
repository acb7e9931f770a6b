//! Vault lifecycle and entry CRUD integration tests.
//!
//! These exercise the public API end to end against a real local store in
//! a temp directory. Crypto unit tests live in src/core/crypto.rs.

use tempfile::TempDir;
use warren::{
    CryptoError, EntryUpdate, Error, LocalStore, Manager, StoreError, Vault, VaultError,
};

const MASTER: &str = "correct-horse-battery";

// Honors RUST_LOG so failing runs can be re-run with debug output.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn manager(tmp: &TempDir) -> Manager {
    init_tracing();
    Manager::new(Box::new(LocalStore::new(tmp.path().join("vault.json"))))
}

fn initialized(tmp: &TempDir) -> Manager {
    let mut mgr = manager(tmp);
    mgr.init(MASTER).unwrap();
    mgr
}

fn vault_file(tmp: &TempDir) -> String {
    std::fs::read_to_string(tmp.path().join("vault.json")).unwrap()
}

// --- Lifecycle ---

#[test]
fn test_init_then_reopen() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.add_entry("github", "alice", "s3cr3t", "", "", vec![])
        .unwrap();
    mgr.close();

    let mut mgr = manager(&tmp);
    mgr.open(MASTER).unwrap();
    assert_eq!(mgr.list_entries().unwrap().len(), 1);
    assert_eq!(
        mgr.get_decrypted_password("github").unwrap().as_str(),
        "s3cr3t"
    );
}

#[test]
fn test_init_on_existing_store_fails() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.close();

    let err = mgr.init(MASTER).unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::VaultExists)));

    // A second manager over the same path fails the same way.
    let err = manager(&tmp).init(MASTER).unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::VaultExists)));
}

#[test]
fn test_open_missing_store_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = manager(&tmp).open(MASTER).unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::NotFound)));
}

#[test]
fn test_double_open_fails() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    let err = mgr.open(MASTER).unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::AlreadyOpen)));
}

#[test]
fn test_close_is_idempotent_and_blocks_operations() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    mgr.close();
    mgr.close();

    assert!(!mgr.is_open());
    let err = mgr.get_entry("github").unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::NotOpen)));
}

#[test]
fn test_wrong_password_is_accepted_until_first_decrypt() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.add_entry("github", "alice", "s3cr3t", "", "", vec![])
        .unwrap();
    mgr.close();

    // Open succeeds at the parse level; no key-correctness check is made.
    let mut mgr = manager(&tmp);
    mgr.open("wrong-password").unwrap();
    assert!(mgr.is_open());

    // Metadata access works; the failure surfaces on the first decrypt.
    assert_eq!(mgr.get_entry("github").unwrap().username, "alice");
    let err = mgr.get_decrypted_password("github").unwrap_err();
    assert!(matches!(err, Error::Crypto(CryptoError::DecryptionFailed)));
}

#[test]
fn test_info_reflects_open_vault() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.add_entry("github", "alice", "pw", "", "", vec![])
        .unwrap();

    let info = mgr.info().unwrap();
    assert_eq!(info.version, "1.0");
    assert_eq!(info.entries, 1);

    mgr.close();
    assert!(mgr.info().is_none());
}

// --- Entries ---

#[test]
fn test_add_get_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    mgr.add_entry(
        "github",
        "alice",
        "s3cr3t",
        "https://github.com",
        "",
        vec!["work".to_string()],
    )
    .unwrap();

    let entry = mgr.get_entry("github").unwrap();
    assert_eq!(entry.name, "github");
    assert_eq!(entry.username, "alice");
    assert_eq!(entry.url, "https://github.com");
    assert_eq!(entry.tags, vec!["work"]);
    // Ciphertext, not the plaintext password.
    assert_ne!(entry.password, "s3cr3t");

    assert_eq!(
        mgr.get_decrypted_password("github").unwrap().as_str(),
        "s3cr3t"
    );
}

#[test]
fn test_add_duplicate_name_fails() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    mgr.add_entry("github", "alice", "pw", "", "", vec![])
        .unwrap();
    let err = mgr
        .add_entry("github", "bob", "pw2", "", "", vec![])
        .unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::EntryExists(_))));

    // Name uniqueness is exact and case-sensitive.
    mgr.add_entry("GitHub", "bob", "pw2", "", "", vec![])
        .unwrap();
}

#[test]
fn test_delete_then_get_fails_and_readd_is_allowed() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    mgr.add_entry("github", "alice", "pw", "", "", vec![])
        .unwrap();
    mgr.delete_entry("github").unwrap();

    let err = mgr.get_entry("github").unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::EntryNotFound(_))));

    let err = mgr.delete_entry("github").unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::EntryNotFound(_))));

    // Uniqueness is enforced only among entries currently present.
    mgr.add_entry("github", "alice", "pw", "", "", vec![])
        .unwrap();
}

#[test]
fn test_empty_notes_stay_unencrypted() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    mgr.add_entry("github", "alice", "pw", "", "", vec![])
        .unwrap();

    assert_eq!(mgr.get_entry("github").unwrap().notes, "");
    assert_eq!(mgr.get_decrypted_notes("github").unwrap().as_str(), "");
}

#[test]
fn test_nonempty_notes_are_encrypted() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    mgr.add_entry("github", "alice", "pw", "", "recovery code 1234", vec![])
        .unwrap();

    let stored = mgr.get_entry("github").unwrap().notes;
    assert_ne!(stored, "recovery code 1234");
    assert_eq!(
        mgr.get_decrypted_notes("github").unwrap().as_str(),
        "recovery code 1234"
    );
}

#[test]
fn test_secrets_never_hit_disk_in_plaintext() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    mgr.add_entry(
        "github",
        "alice",
        "hunter2-plaintext",
        "",
        "secret recovery notes",
        vec![],
    )
    .unwrap();

    let raw = vault_file(&tmp);
    assert!(!raw.contains("hunter2-plaintext"));
    assert!(!raw.contains("secret recovery notes"));
    // Plaintext fields are stored as-is.
    assert!(raw.contains("alice"));
}

#[test]
fn test_list_preserves_insertion_order() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    for name in ["zulu", "alpha", "mike"] {
        mgr.add_entry(name, "u", "p", "", "", vec![]).unwrap();
    }

    let names: Vec<String> = mgr
        .list_entries()
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, ["zulu", "alpha", "mike"]);
}

// --- Updates ---

#[test]
fn test_update_applies_only_present_fields() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.add_entry("github", "alice", "pw", "https://github.com", "", vec![])
        .unwrap();

    mgr.update_entry(
        "github",
        EntryUpdate {
            username: Some("alice-dev".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let entry = mgr.get_entry("github").unwrap();
    assert_eq!(entry.username, "alice-dev");
    assert_eq!(entry.url, "https://github.com");
    assert_eq!(mgr.get_decrypted_password("github").unwrap().as_str(), "pw");
}

#[test]
fn test_update_password_reencrypts_with_fresh_nonce() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.add_entry("github", "alice", "old", "", "", vec![])
        .unwrap();
    let before = mgr.get_entry("github").unwrap().password;

    mgr.update_entry(
        "github",
        EntryUpdate {
            password: Some("new".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let after = mgr.get_entry("github").unwrap().password;
    assert_ne!(before, after);
    assert_eq!(mgr.get_decrypted_password("github").unwrap().as_str(), "new");
}

#[test]
fn test_update_empty_password_is_still_encrypted() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.add_entry("github", "alice", "old", "", "", vec![])
        .unwrap();

    mgr.update_entry(
        "github",
        EntryUpdate {
            password: Some(String::new()),
            ..Default::default()
        },
    )
    .unwrap();

    // Unlike notes, an empty password has no unencrypted-empty marker:
    // it is sealed like any other value.
    let stored = mgr.get_entry("github").unwrap().password;
    assert!(!stored.is_empty());
    assert_eq!(mgr.get_decrypted_password("github").unwrap().as_str(), "");
}

#[test]
fn test_update_empty_notes_clears_to_unencrypted() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.add_entry("github", "alice", "pw", "", "some notes", vec![])
        .unwrap();

    mgr.update_entry(
        "github",
        EntryUpdate {
            notes: Some(String::new()),
            ..Default::default()
        },
    )
    .unwrap();

    // Empty marker, not a decrypt call.
    assert_eq!(mgr.get_entry("github").unwrap().notes, "");
    assert_eq!(mgr.get_decrypted_notes("github").unwrap().as_str(), "");
}

#[test]
fn test_update_refreshes_updated_at() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.add_entry("github", "alice", "pw", "", "", vec![])
        .unwrap();
    let before = mgr.get_entry("github").unwrap();

    std::thread::sleep(std::time::Duration::from_millis(10));
    mgr.update_entry(
        "github",
        EntryUpdate {
            url: Some("https://github.com".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let entry = mgr.get_entry("github").unwrap();
    assert!(entry.updated_at > before.updated_at);
    assert_eq!(entry.created_at, before.created_at);
    assert_eq!(entry.id, before.id);
}

#[test]
fn test_update_missing_entry_fails() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    let err = mgr
        .update_entry("nope", EntryUpdate::default())
        .unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::EntryNotFound(_))));
}

// --- Search ---

#[test]
fn test_search_matches_all_indexed_fields() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    mgr.add_entry("github", "alice", "pw", "https://github.com", "", vec![])
        .unwrap();
    mgr.add_entry("bank", "carol@example.com", "pw", "", "", vec![])
        .unwrap();
    mgr.add_entry(
        "router",
        "admin",
        "pw",
        "",
        "",
        vec!["home-network".to_string()],
    )
    .unwrap();

    assert_eq!(mgr.search_entries("hub").unwrap().len(), 1);
    assert_eq!(mgr.search_entries("carol").unwrap().len(), 1);
    assert_eq!(mgr.search_entries("network").unwrap().len(), 1);
    assert!(mgr.search_entries("missing").unwrap().is_empty());
}

#[test]
fn test_search_is_case_insensitive() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.add_entry("GitHub", "Alice", "pw", "", "", vec![])
        .unwrap();

    assert_eq!(mgr.search_entries("github").unwrap().len(), 1);
    assert_eq!(mgr.search_entries("ALICE").unwrap().len(), 1);
}

#[test]
fn test_search_deduplicates_multi_field_matches() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    // Matches "git" in both name and tag; must appear exactly once.
    mgr.add_entry(
        "github",
        "alice",
        "pw",
        "",
        "",
        vec!["git-hosting".to_string()],
    )
    .unwrap();

    let results = mgr.search_entries("git").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "github");
}

#[test]
fn test_search_preserves_vault_order() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);

    mgr.add_entry("work-email", "a", "pw", "", "", vec![])
        .unwrap();
    mgr.add_entry("personal", "b", "pw", "", "", vec!["work".to_string()])
        .unwrap();
    mgr.add_entry("work-vpn", "c", "pw", "", "", vec![]).unwrap();

    let names: Vec<String> = mgr
        .search_entries("work")
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, ["work-email", "personal", "work-vpn"]);
}

// --- Integrity ---

#[test]
fn test_reload_yields_identical_checksum() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.add_entry("github", "alice", "pw", "", "", vec![])
        .unwrap();
    let persisted = mgr.get_entry("github").unwrap();
    mgr.close();

    let vault: Vault = serde_json::from_str(&vault_file(&tmp)).unwrap();
    let canonical = vault.canonical_bytes().unwrap();
    assert!(warren::core::crypto::verify_checksum(
        &canonical,
        &vault.checksum
    ));
    assert_eq!(vault.entries[0], persisted);
}

#[test]
fn test_flipped_byte_fails_checksum_verification() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.add_entry("github", "alice", "pw", "", "", vec![])
        .unwrap();
    mgr.close();

    // Flip one byte of checksummed content while keeping the JSON valid.
    let raw = vault_file(&tmp);
    assert!(raw.contains("\"version\": \"1.0\""));
    let tampered = raw.replace("\"version\": \"1.0\"", "\"version\": \"1.1\"");
    std::fs::write(tmp.path().join("vault.json"), tampered).unwrap();

    let err = manager(&tmp).open(MASTER).unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::Corrupted(_))));
}

#[test]
fn test_truncated_file_is_corrupted() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = initialized(&tmp);
    mgr.close();

    let raw = vault_file(&tmp);
    std::fs::write(tmp.path().join("vault.json"), &raw[..raw.len() / 2]).unwrap();

    let err = manager(&tmp).open(MASTER).unwrap_err();
    assert!(matches!(err, Error::Vault(VaultError::Corrupted(_))));
}
