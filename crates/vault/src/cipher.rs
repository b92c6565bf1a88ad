//! Cipher trait and the string-blob framing shared by all backends.
//!
//! Encrypted fields are stored as `base64(version_tag || nonce || ciphertext
//! || tag)`. The one-byte version tag identifies the cipher that produced the
//! blob, enabling future cipher migrations; everything else a decrypt needs
//! is inside the blob, so no side-channel metadata travels with it.

use base64::Engine;

use crate::{
    error::{Result, VaultError},
    kdf::UserKey,
};

/// Trait for authenticated encryption with associated data (AEAD).
///
/// Implementations can be swapped without changing the rest of the crate.
pub trait Cipher: Send + Sync {
    /// Unique identifier for this cipher (first byte of every blob).
    fn version_tag(&self) -> u8;

    /// Encrypt `plaintext` under `key`, binding `aad`.
    ///
    /// Returns `[nonce || ciphertext || tag]`; the exact layout is
    /// cipher-specific but must be parseable by [`decrypt`](Self::decrypt).
    /// A fresh nonce per call is required: encrypting the same input twice
    /// must yield different output.
    fn encrypt(&self, key: &[u8; 32], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt a blob previously produced by [`encrypt`](Self::encrypt).
    fn decrypt(&self, key: &[u8; 32], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>>;
}

/// Encrypt a UTF-8 string into a self-describing base64 blob.
pub fn seal<C: Cipher>(cipher: &C, key: &UserKey, plaintext: &str, aad: &str) -> Result<String> {
    let encrypted = cipher.encrypt(key.as_bytes(), plaintext.as_bytes(), aad.as_bytes())?;

    let mut blob = Vec::with_capacity(1 + encrypted.len());
    blob.push(cipher.version_tag());
    blob.extend_from_slice(&encrypted);

    Ok(base64::engine::general_purpose::STANDARD.encode(blob))
}

/// Decrypt a blob produced by [`seal`] back into a string.
///
/// Malformed input of any kind (bad base64, empty blob, unknown version
/// tag, wrong key or AAD, invalid UTF-8) is a
/// [`VaultError::DecryptionFailure`].
pub fn open<C: Cipher>(cipher: &C, key: &UserKey, blob_b64: &str, aad: &str) -> Result<String> {
    let blob = base64::engine::general_purpose::STANDARD
        .decode(blob_b64)
        .map_err(|e| VaultError::DecryptionFailure(format!("base64: {e}")))?;

    if blob.is_empty() {
        return Err(VaultError::DecryptionFailure("empty blob".to_string()));
    }

    let version = blob[0];
    if version != cipher.version_tag() {
        return Err(VaultError::DecryptionFailure(format!(
            "unsupported cipher version: {version:#04x}"
        )));
    }

    let plaintext = cipher.decrypt(key.as_bytes(), &blob[1..], aad.as_bytes())?;
    String::from_utf8(plaintext).map_err(|e| VaultError::DecryptionFailure(e.to_string()))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::xchacha20::XChaCha20Poly1305Cipher};

    fn test_key() -> UserKey {
        UserKey::from_bytes([0x42; 32])
    }

    #[test]
    fn seal_open_round_trip() {
        let cipher = XChaCha20Poly1305Cipher;
        let key = test_key();

        let blob = seal(&cipher, &key, "hunter2", "item:password").unwrap();
        assert_ne!(blob, "hunter2");
        let plain = open(&cipher, &key, &blob, "item:password").unwrap();
        assert_eq!(plain, "hunter2");
    }

    #[test]
    fn sealing_twice_differs() {
        let cipher = XChaCha20Poly1305Cipher;
        let key = test_key();

        let a = seal(&cipher, &key, "same input", "aad").unwrap();
        let b = seal(&cipher, &key, "same input", "aad").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_aad_fails() {
        let cipher = XChaCha20Poly1305Cipher;
        let key = test_key();

        let blob = seal(&cipher, &key, "secret", "item:notes").unwrap();
        let result = open(&cipher, &key, &blob, "item:url");
        assert!(matches!(result, Err(VaultError::DecryptionFailure(_))));
    }

    #[test]
    fn invalid_base64_fails() {
        let cipher = XChaCha20Poly1305Cipher;
        let result = open(&cipher, &test_key(), "not//valid==base64!!", "aad");
        assert!(matches!(result, Err(VaultError::DecryptionFailure(_))));
    }

    #[test]
    fn empty_blob_fails() {
        let cipher = XChaCha20Poly1305Cipher;
        let result = open(&cipher, &test_key(), "", "aad");
        assert!(matches!(result, Err(VaultError::DecryptionFailure(_))));
    }

    #[test]
    fn unknown_version_tag_fails() {
        let cipher = XChaCha20Poly1305Cipher;
        let key = test_key();

        let blob = seal(&cipher, &key, "secret", "aad").unwrap();
        let mut raw = base64::engine::general_purpose::STANDARD
            .decode(&blob)
            .unwrap();
        raw[0] = 0x7F;
        let tampered = base64::engine::general_purpose::STANDARD.encode(raw);

        let result = open(&cipher, &key, &tampered, "aad");
        assert!(matches!(result, Err(VaultError::DecryptionFailure(_))));
    }

    #[test]
    fn unicode_round_trip() {
        let cipher = XChaCha20Poly1305Cipher;
        let key = test_key();

        let input = "pâsswörd ☃ 密码";
        let blob = seal(&cipher, &key, input, "aad").unwrap();
        assert_eq!(open(&cipher, &key, &blob, "aad").unwrap(), input);
    }
}
