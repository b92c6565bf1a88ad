//! XChaCha20-Poly1305 implementation of the [`Cipher`] trait.

#[allow(deprecated)] // upstream generic-array 0.x deprecation
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use rand::RngCore;

use crate::{
    cipher::Cipher,
    error::{Result, VaultError},
};

/// Version tag for the XChaCha20-Poly1305 cipher.
pub const VERSION_TAG: u8 = 0x01;

/// Nonce size for XChaCha20-Poly1305 (24 bytes).
const NONCE_LEN: usize = 24;

/// Poly1305 authentication tag size.
const TAG_LEN: usize = 16;

/// XChaCha20-Poly1305 AEAD cipher.
///
/// Blob layout: `[nonce: 24 bytes][ciphertext + Poly1305 tag: N + 16 bytes]`.
/// The extended nonce is drawn fresh from the thread-local CSPRNG on every
/// call, so identical plaintext never produces identical ciphertext.
pub struct XChaCha20Poly1305Cipher;

impl Cipher for XChaCha20Poly1305Cipher {
    fn version_tag(&self) -> u8 {
        VERSION_TAG
    }

    #[allow(deprecated)]
    fn encrypt(&self, key: &[u8; 32], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let cipher = XChaCha20Poly1305::new(key.into());

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = XNonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, Payload {
                msg: plaintext,
                aad,
            })
            .map_err(|e| VaultError::EncryptionFailure(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    #[allow(deprecated)]
    fn decrypt(&self, key: &[u8; 32], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_LEN + TAG_LEN {
            return Err(VaultError::DecryptionFailure(
                "ciphertext too short".to_string(),
            ));
        }

        let (nonce_bytes, ct) = ciphertext.split_at(NONCE_LEN);
        let nonce = XNonce::from_slice(nonce_bytes);
        let cipher = XChaCha20Poly1305::new(key.into());

        cipher
            .decrypt(nonce, Payload { msg: ct, aad })
            .map_err(|e| VaultError::DecryptionFailure(e.to_string()))
    }
}
