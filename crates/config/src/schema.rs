//! Config schema: database, encryption, and auth sections.

use {secrecy::Secret, serde::Deserialize};

/// Top-level lockstash configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LockstashConfig {
    pub database: DatabaseConfig,
    pub encryption: EncryptionConfig,
    pub auth: AuthConfig,
}

/// SQLite database location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "lockstash.db".into(),
        }
    }
}

/// Master key material for vault encryption.
///
/// Exactly one of `master_key` / `master_passphrase` should be set, usually
/// via `${ENV_VAR}` substitution. There is no built-in default: a missing
/// master secret is a startup error, not a silent fallback key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    /// Base64-encoded 32-byte master key, e.g. `"${LOCKSTASH_MASTER_KEY}"`.
    pub master_key: Option<Secret<String>>,
    /// Alternative: a passphrase stretched into the master key via Argon2id.
    pub master_passphrase: Option<Secret<String>>,
    /// Argon2id cost parameters for passphrase stretching.
    pub kdf: KdfParams,
}

/// Argon2id parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 64 MiB = 65536).
    pub m_cost: u32,
    /// Number of iterations (default: 3).
    pub t_cost: u32,
    /// Degree of parallelism (default: 1).
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: 65536, // 64 MiB
            t_cost: 3,
            p_cost: 1,
        }
    }
}

/// Account and session policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Minimum accepted password length at registration.
    pub min_password_len: usize,
    /// Session token lifetime in days.
    pub session_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_len: 8,
            session_ttl_days: 7,
        }
    }
}
