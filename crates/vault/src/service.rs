//! The single encryption boundary for vault items.
//!
//! Plaintext exists only on the caller's side of [`VaultService`]. Every
//! operation derives the owner's key, runs the codec, and hands the store an
//! opaque [`VaultRecord`](crate::item::VaultRecord); nothing behind the
//! service ever sees a plaintext field, and nothing in front of it ever sees
//! ciphertext. Re-encrypting an already-encrypted record is unrepresentable:
//! the codec only accepts [`NewVaultItem`] drafts and the store only accepts
//! encrypted records.

use std::sync::Arc;

use crate::{
    cipher::Cipher,
    error::{Result, VaultError},
    item::{self, NewVaultItem, VaultItem},
    kdf::KeyDerivation,
    store::VaultStore,
    xchacha20::XChaCha20Poly1305Cipher,
};

/// The authenticated caller, as established by the auth layer.
///
/// `email` is the key-derivation identity; `user_id` scopes storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub email: String,
}

/// Vault item operations behind the encryption boundary.
pub struct VaultService<C: Cipher = XChaCha20Poly1305Cipher> {
    store: Arc<dyn VaultStore>,
    keys: KeyDerivation,
    cipher: C,
}

impl VaultService<XChaCha20Poly1305Cipher> {
    /// Create a service with the default XChaCha20-Poly1305 cipher.
    pub fn new(store: Arc<dyn VaultStore>, keys: KeyDerivation) -> Self {
        Self::with_cipher(store, keys, XChaCha20Poly1305Cipher)
    }
}

impl<C: Cipher> VaultService<C> {
    /// Create a service with a custom cipher.
    pub fn with_cipher(store: Arc<dyn VaultStore>, keys: KeyDerivation, cipher: C) -> Self {
        Self {
            store,
            keys,
            cipher,
        }
    }

    /// Encrypt and persist a new item.
    ///
    /// Returns the plaintext view with its assigned id and timestamps.
    pub async fn create(&self, who: &Principal, draft: NewVaultItem) -> Result<VaultItem> {
        draft.validate()?;
        let key = self.keys.derive_user_key(&who.email)?;
        let fields = item::encrypt_item(&self.cipher, &key, &draft)?;
        let record = self.store.insert(who.user_id, &fields).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(item_id = record.id, owner_id = who.user_id, "vault item created");

        Ok(VaultItem {
            id: record.id,
            owner_id: record.owner_id,
            title: draft.title,
            username: draft.username,
            password: draft.password,
            url: draft.url,
            notes: draft.notes,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Fetch and decrypt one item.
    ///
    /// An item that doesn't exist and an item owned by someone else are both
    /// [`VaultError::NotFound`].
    pub async fn get(&self, who: &Principal, id: i64) -> Result<VaultItem> {
        let record = self
            .store
            .get(id, who.user_id)
            .await?
            .ok_or(VaultError::NotFound)?;
        let key = self.keys.derive_user_key(&who.email)?;
        item::decrypt_record(&self.cipher, &key, &record)
    }

    /// Fetch and decrypt all of the caller's items, newest first.
    pub async fn list(&self, who: &Principal) -> Result<Vec<VaultItem>> {
        let key = self.keys.derive_user_key(&who.email)?;
        let records = self.store.list(who.user_id).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            count = records.len(),
            owner_id = who.user_id,
            "listing vault items"
        );

        records
            .iter()
            .map(|record| item::decrypt_record(&self.cipher, &key, record))
            .collect()
    }

    /// Re-encrypt every field from the draft and replace the stored record.
    pub async fn update(&self, who: &Principal, id: i64, draft: NewVaultItem) -> Result<VaultItem> {
        draft.validate()?;
        let key = self.keys.derive_user_key(&who.email)?;
        let fields = item::encrypt_item(&self.cipher, &key, &draft)?;
        let record = self
            .store
            .update(id, who.user_id, &fields)
            .await?
            .ok_or(VaultError::NotFound)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(item_id = id, owner_id = who.user_id, "vault item updated");

        Ok(VaultItem {
            id: record.id,
            owner_id: record.owner_id,
            title: draft.title,
            username: draft.username,
            password: draft.password,
            url: draft.url,
            notes: draft.notes,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Hard-delete an item.
    pub async fn delete(&self, who: &Principal, id: i64) -> Result<()> {
        if !self.store.delete(id, who.user_id).await? {
            return Err(VaultError::NotFound);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(item_id = id, owner_id = who.user_id, "vault item deleted");

        Ok(())
    }
}
