//! Core library components.
//!
//! This module contains the reusable business logic for credential
//! management: encryption, the vault data model, storage backends, and
//! configuration handling.

pub mod config;
pub mod constants;
pub mod crypto;
pub mod store;
pub mod types;
pub mod vault;
