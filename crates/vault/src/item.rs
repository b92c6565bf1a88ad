//! Vault item types and the field-by-field codec.
//!
//! Each secret field is encrypted as its own unit with a field-specific AAD,
//! so a blob can never be replayed into a different field and a future
//! partial-field update never forces re-encrypting unrelated fields.

use serde::{Deserialize, Serialize};

use crate::{
    cipher::{self, Cipher},
    error::{Result, VaultError},
    kdf::UserKey,
};

/// A plaintext item as submitted for creation or update.
///
/// `url` and `notes` are optional in the sense of "may be empty": always a
/// string, never null, so the codec treats every field uniformly.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVaultItem {
    pub title: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub notes: String,
}

impl NewVaultItem {
    /// `title`, `username`, and `password` must be non-empty.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("title", &self.title),
            ("username", &self.username),
            ("password", &self.password),
        ] {
            if value.is_empty() {
                return Err(VaultError::InvalidItem { field });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for NewVaultItem {
    // Every field is a secret; keep them all out of debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewVaultItem").finish_non_exhaustive()
    }
}

/// A decrypted item with its storage identity and timestamps.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultItem {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

impl std::fmt::Debug for VaultItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultItem")
            .field("id", &self.id)
            .field("owner_id", &self.owner_id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// The encrypted-at-rest representation: same shape as [`VaultItem`] with
/// every secret field replaced by an opaque blob, or `""` where the optional
/// plaintext was empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultRecord {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Ciphertext for the five secret fields, before a row exists.
#[derive(Debug, Clone)]
pub struct EncryptedFields {
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
}

fn field_aad(field: &str) -> String {
    format!("item:{field}")
}

/// Encrypt a draft's fields under one user key.
///
/// `url`/`notes` pass through as `""` when empty: an empty optional field is
/// not a secret and costs no ciphertext overhead.
pub fn encrypt_item<C: Cipher>(
    cipher: &C,
    key: &UserKey,
    item: &NewVaultItem,
) -> Result<EncryptedFields> {
    let seal = |field: &str, value: &str| cipher::seal(cipher, key, value, &field_aad(field));

    Ok(EncryptedFields {
        title: seal("title", &item.title)?,
        username: seal("username", &item.username)?,
        password: seal("password", &item.password)?,
        url: if item.url.is_empty() {
            String::new()
        } else {
            seal("url", &item.url)?
        },
        notes: if item.notes.is_empty() {
            String::new()
        } else {
            seal("notes", &item.notes)?
        },
    })
}

/// Decrypt a stored record back to the plaintext item.
///
/// A field that fails to decrypt (tampered, truncated, or encrypted under a
/// different user's key) yields [`VaultError::CorruptItem`] naming the field
/// and never the offending value. Empty optional fields decrypt to `""`
/// without invoking the cipher.
pub fn decrypt_record<C: Cipher>(
    cipher: &C,
    key: &UserKey,
    record: &VaultRecord,
) -> Result<VaultItem> {
    let open = |field: &'static str, blob: &str| {
        cipher::open(cipher, key, blob, &field_aad(field)).map_err(|e| VaultError::CorruptItem {
            field,
            source: Box::new(e),
        })
    };

    Ok(VaultItem {
        id: record.id,
        owner_id: record.owner_id,
        title: open("title", &record.title)?,
        username: open("username", &record.username)?,
        password: open("password", &record.password)?,
        url: if record.url.is_empty() {
            String::new()
        } else {
            open("url", &record.url)?
        },
        notes: if record.notes.is_empty() {
            String::new()
        } else {
            open("notes", &record.notes)?
        },
        created_at: record.created_at.clone(),
        updated_at: record.updated_at.clone(),
    })
}
