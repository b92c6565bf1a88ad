//! Key derivation: server-side master secret into per-user vault keys.
//!
//! Emails are public, so they only *select* a key, never act as one:
//! HKDF-SHA256 expands a high-entropy [`MasterSecret`] with the normalized
//! email as the info string. Each user gets a distinct, deterministic key,
//! and none of them is recoverable without the master secret.

use {
    argon2::Argon2,
    base64::Engine,
    hkdf::Hkdf,
    lockstash_config::{EncryptionConfig, KdfParams},
    secrecy::ExposeSecret,
    sha2::Sha256,
    zeroize::Zeroize,
};

use crate::error::{Result, VaultError};

/// Key length for all derived keys (the XChaCha20-Poly1305 key size).
pub const KEY_LEN: usize = 32;

/// Domain-separation salt for per-user key expansion.
const USER_KEY_SALT: &[u8] = b"lockstash.vault.user-key.v1";

/// Fixed salt for passphrase stretching. Domain separation only; the
/// passphrase itself must carry the entropy.
const PASSPHRASE_SALT: &[u8] = b"lockstash.vault.master-passphrase.v1";

/// A 256-bit per-user vault key.
///
/// Zeroized on drop, redacted in `Debug`, never serialized or persisted.
/// Recomputed from the identity on demand; holding one across requests is
/// never necessary.
pub struct UserKey {
    bytes: [u8; KEY_LEN],
}

impl UserKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl Drop for UserKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// The server-side secret all per-user keys are derived from.
pub struct MasterSecret {
    bytes: [u8; KEY_LEN],
}

impl MasterSecret {
    /// Use raw key material directly.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Build from config: a base64 `master_key`, or a `master_passphrase`
    /// stretched via Argon2id. Fails if neither is set; there is no default
    /// key.
    pub fn from_config(cfg: &EncryptionConfig) -> Result<Self> {
        if let Some(b64) = &cfg.master_key {
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(b64.expose_secret())
                .map_err(|e| VaultError::Config(format!("master_key is not valid base64: {e}")))?;
            let bytes: [u8; KEY_LEN] = decoded.try_into().map_err(|_| {
                VaultError::Config("master_key must decode to exactly 32 bytes".to_string())
            })?;
            return Ok(Self::from_bytes(bytes));
        }

        if let Some(passphrase) = &cfg.master_passphrase {
            return Self::from_passphrase(passphrase.expose_secret(), &cfg.kdf);
        }

        Err(VaultError::Config(
            "no master key material configured \
             (set encryption.master_key or encryption.master_passphrase)"
                .to_string(),
        ))
    }

    /// Stretch a passphrase into a master secret with Argon2id.
    pub fn from_passphrase(passphrase: &str, params: &KdfParams) -> Result<Self> {
        let argon2_params =
            argon2::Params::new(params.m_cost, params.t_cost, params.p_cost, Some(KEY_LEN))
                .map_err(|e| VaultError::Config(format!("invalid KDF params: {e}")))?;

        let argon2 = Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2_params,
        );

        let mut bytes = [0u8; KEY_LEN];
        argon2
            .hash_password_into(passphrase.as_bytes(), PASSPHRASE_SALT, &mut bytes)
            .map_err(|e| VaultError::Config(format!("KDF failed: {e}")))?;

        Ok(Self { bytes })
    }

    fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl Drop for MasterSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterSecret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// The key-derivation policy: identity in, deterministic key out.
pub struct KeyDerivation {
    master: MasterSecret,
}

impl KeyDerivation {
    pub fn new(master: MasterSecret) -> Self {
        Self { master }
    }

    pub fn from_config(cfg: &EncryptionConfig) -> Result<Self> {
        Ok(Self::new(MasterSecret::from_config(cfg)?))
    }

    /// Derive the vault key for one user identity (their email).
    ///
    /// Deterministic: the same identity always yields the same key, so
    /// previously stored items stay decryptable. Derivation depends on
    /// nothing volatile (no session or token material). Fails with
    /// [`VaultError::InvalidIdentity`] on an empty or blank identity.
    pub fn derive_user_key(&self, identity: &str) -> Result<UserKey> {
        let email = normalize_email(identity);
        if email.is_empty() {
            return Err(VaultError::InvalidIdentity);
        }

        let hk = Hkdf::<Sha256>::new(Some(USER_KEY_SALT), self.master.as_bytes());
        let mut okm = [0u8; KEY_LEN];
        hk.expand(format!("user:{email}").as_bytes(), &mut okm)
            .map_err(|e| VaultError::EncryptionFailure(format!("HKDF expand: {e}")))?;

        Ok(UserKey::from_bytes(okm))
    }
}

/// Normalize an email for uniqueness comparison and key derivation: trim
/// surrounding whitespace, lowercase ASCII.
///
/// The case policy is fixed here, once, so `Alice@X.com` and `alice@x.com`
/// always map to the same account and the same key.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret};

    fn test_keys() -> KeyDerivation {
        KeyDerivation::new(MasterSecret::from_bytes([0x5A; KEY_LEN]))
    }

    #[test]
    fn derivation_is_deterministic() {
        let keys = test_keys();
        let a = keys.derive_user_key("user@example.com").unwrap();
        let b = keys.derive_user_key("user@example.com").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn deterministic_across_instances() {
        let a = test_keys().derive_user_key("user@example.com").unwrap();
        let b = test_keys().derive_user_key("user@example.com").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_identities_different_keys() {
        let keys = test_keys();
        let a = keys.derive_user_key("a@x.com").unwrap();
        let b = keys.derive_user_key("b@x.com").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_masters_different_keys() {
        let a = KeyDerivation::new(MasterSecret::from_bytes([0x01; KEY_LEN]))
            .derive_user_key("user@example.com")
            .unwrap();
        let b = KeyDerivation::new(MasterSecret::from_bytes([0x02; KEY_LEN]))
            .derive_user_key("user@example.com")
            .unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn identity_is_case_and_whitespace_insensitive() {
        let keys = test_keys();
        let a = keys.derive_user_key("User@Example.COM").unwrap();
        let b = keys.derive_user_key("  user@example.com  ").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn blank_identity_rejected() {
        let keys = test_keys();
        assert!(matches!(
            keys.derive_user_key(""),
            Err(VaultError::InvalidIdentity)
        ));
        assert!(matches!(
            keys.derive_user_key("   "),
            Err(VaultError::InvalidIdentity)
        ));
    }

    #[test]
    fn master_from_base64_key() {
        let cfg = EncryptionConfig {
            master_key: Some(Secret::new(
                base64::engine::general_purpose::STANDARD.encode([0x5A; KEY_LEN]),
            )),
            ..Default::default()
        };
        let derived = KeyDerivation::from_config(&cfg)
            .unwrap()
            .derive_user_key("user@example.com")
            .unwrap();
        let expected = test_keys().derive_user_key("user@example.com").unwrap();
        assert_eq!(derived.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn master_from_bad_base64_rejected() {
        let cfg = EncryptionConfig {
            master_key: Some(Secret::new("!!not base64!!".to_string())),
            ..Default::default()
        };
        assert!(matches!(
            MasterSecret::from_config(&cfg),
            Err(VaultError::Config(_))
        ));
    }

    #[test]
    fn master_with_wrong_length_rejected() {
        let cfg = EncryptionConfig {
            master_key: Some(Secret::new(
                base64::engine::general_purpose::STANDARD.encode([0x5A; 16]),
            )),
            ..Default::default()
        };
        assert!(matches!(
            MasterSecret::from_config(&cfg),
            Err(VaultError::Config(_))
        ));
    }

    #[test]
    fn master_from_passphrase_is_deterministic() {
        let params = KdfParams {
            m_cost: 256, // Low cost for tests
            t_cost: 1,
            p_cost: 1,
        };
        let a = MasterSecret::from_passphrase("correct horse battery staple", &params).unwrap();
        let b = MasterSecret::from_passphrase("correct horse battery staple", &params).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());

        let c = MasterSecret::from_passphrase("different passphrase", &params).unwrap();
        assert_ne!(a.as_bytes(), c.as_bytes());
    }

    #[test]
    fn missing_master_material_rejected() {
        let cfg = EncryptionConfig::default();
        assert!(matches!(
            MasterSecret::from_config(&cfg),
            Err(VaultError::Config(_))
        ));
    }

    #[test]
    fn normalize_email_rules() {
        assert_eq!(normalize_email(" User@Example.COM "), "user@example.com");
        assert_eq!(normalize_email("plain@x.com"), "plain@x.com");
        assert_eq!(normalize_email("  "), "");
    }

    #[test]
    fn debug_is_redacted() {
        let keys = test_keys();
        let key = keys.derive_user_key("user@example.com").unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
        assert!(format!("{:?}", MasterSecret::from_bytes([7; KEY_LEN])).contains("REDACTED"));
    }
}
