//! Accounts and sessions for the vault.
//!
//! This crate provides:
//! - [`UserStore`]: registration and login with Argon2id password hashes
//! - [`SessionStore`]: opaque bearer tokens that resolve to a
//!   [`Principal`](lockstash_vault::Principal)
//!
//! The password hash verifies credentials only. Vault encryption keys are
//! derived separately (see `lockstash-vault`); knowing a user's password
//! hash reveals nothing about their vault key.

pub mod error;
pub mod sessions;
pub mod users;

pub use {
    error::AuthError,
    sessions::SessionStore,
    users::{User, UserStore},
};
