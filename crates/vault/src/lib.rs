//! Encryption-at-rest for vault items using XChaCha20-Poly1305.
//!
//! Each user's items are encrypted field-by-field under a per-user key
//! derived from a server-side [`MasterSecret`] via HKDF-SHA256, keyed by the
//! user's normalized email. [`VaultService`] is the single encryption
//! boundary: plaintext exists only on its caller's side, and everything
//! behind it handles opaque ciphertext. Trait-based [`Cipher`] design allows
//! swapping the encryption backend.

pub mod cipher;
pub mod error;
pub mod item;
pub mod kdf;
pub mod service;
pub mod store;
pub mod xchacha20;

pub use {
    cipher::Cipher,
    error::VaultError,
    item::{NewVaultItem, VaultItem, VaultRecord},
    kdf::{KeyDerivation, MasterSecret, UserKey, normalize_email},
    service::{Principal, VaultService},
    store::{SqliteVaultStore, VaultStore},
    xchacha20::XChaCha20Poly1305Cipher,
};
