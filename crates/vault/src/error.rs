//! Vault error types.

/// Errors produced by vault operations.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Key derivation was given an empty or blank identity.
    #[error("invalid identity for key derivation")]
    InvalidIdentity,

    /// A mandatory item field was empty at creation time.
    #[error("missing required field: {field}")]
    InvalidItem { field: &'static str },

    /// The encryption primitive failed. Never carries plaintext or key.
    #[error("encryption failed: {0}")]
    EncryptionFailure(String),

    /// Ciphertext was malformed, truncated, or produced under a different
    /// key or AAD. There is no silent empty-string fallback.
    #[error("decryption failed: {0}")]
    DecryptionFailure(String),

    /// A stored field failed to decrypt. Names the field, never the value.
    #[error("vault item field `{field}` failed to decrypt")]
    CorruptItem {
        field: &'static str,
        #[source]
        source: Box<VaultError>,
    },

    /// The item does not exist, or belongs to another user.
    #[error("vault item not found")]
    NotFound,

    /// Key material configuration problem.
    #[error("encryption config error: {0}")]
    Config(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, VaultError>;
