//! Persistence boundary for encrypted vault records.

use {async_trait::async_trait, sqlx::SqlitePool};

use crate::{
    error::{Result, VaultError},
    item::{EncryptedFields, VaultRecord},
};

/// The contract the vault service needs from persistence.
///
/// Implementations hold opaque ciphertext only and MUST scope every
/// operation by `owner_id`: one user can never reach another's records
/// through this interface. Missing rows are `None`/`false` here, not errors;
/// the service layer decides what "not found" means.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Persist a new record, returning it with id and timestamps assigned.
    async fn insert(&self, owner_id: i64, fields: &EncryptedFields) -> Result<VaultRecord>;

    /// Fetch one record by id, scoped to its owner.
    async fn get(&self, id: i64, owner_id: i64) -> Result<Option<VaultRecord>>;

    /// All records for one owner, newest first.
    async fn list(&self, owner_id: i64) -> Result<Vec<VaultRecord>>;

    /// Replace all field ciphertext and bump `updated_at`.
    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        fields: &EncryptedFields,
    ) -> Result<Option<VaultRecord>>;

    /// Hard-delete a record. Returns whether a row was removed.
    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool>;
}

const RECORD_COLUMNS: &str = "id, owner_id, title, username, password, url, notes, \
     strftime('%Y-%m-%dT%H:%M:%SZ', created_at), strftime('%Y-%m-%dT%H:%M:%SZ', updated_at)";

type RecordRow = (
    i64,
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
);

fn record_from_row(row: RecordRow) -> VaultRecord {
    let (id, owner_id, title, username, password, url, notes, created_at, updated_at) = row;
    VaultRecord {
        id,
        owner_id,
        title,
        username,
        password,
        url,
        notes,
        created_at,
        updated_at,
    }
}

/// SQLite-backed store.
///
/// The pool is injected at construction (no ambient global connection);
/// tables are created idempotently on startup.
pub struct SqliteVaultStore {
    pool: SqlitePool,
}

impl SqliteVaultStore {
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS vault_items (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id   INTEGER NOT NULL,
                title      TEXT NOT NULL,
                username   TEXT NOT NULL,
                password   TEXT NOT NULL,
                url        TEXT NOT NULL DEFAULT '',
                notes      TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch(&self, id: i64, owner_id: i64) -> Result<Option<VaultRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM vault_items WHERE id = ? AND owner_id = ?");
        let row: Option<RecordRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(record_from_row))
    }
}

#[async_trait]
impl VaultStore for SqliteVaultStore {
    async fn insert(&self, owner_id: i64, fields: &EncryptedFields) -> Result<VaultRecord> {
        let result = sqlx::query(
            "INSERT INTO vault_items (owner_id, title, username, password, url, notes)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(owner_id)
        .bind(&fields.title)
        .bind(&fields.username)
        .bind(&fields.password)
        .bind(&fields.url)
        .bind(&fields.notes)
        .execute(&self.pool)
        .await?;

        self.fetch(result.last_insert_rowid(), owner_id)
            .await?
            .ok_or(VaultError::NotFound)
    }

    async fn get(&self, id: i64, owner_id: i64) -> Result<Option<VaultRecord>> {
        self.fetch(id, owner_id).await
    }

    async fn list(&self, owner_id: i64) -> Result<Vec<VaultRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM vault_items WHERE owner_id = ?
             ORDER BY created_at DESC, id DESC"
        );
        let rows: Vec<RecordRow> = sqlx::query_as(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(record_from_row).collect())
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        fields: &EncryptedFields,
    ) -> Result<Option<VaultRecord>> {
        let result = sqlx::query(
            "UPDATE vault_items
             SET title = ?, username = ?, password = ?, url = ?, notes = ?,
                 updated_at = datetime('now')
             WHERE id = ? AND owner_id = ?",
        )
        .bind(&fields.title)
        .bind(&fields.username)
        .bind(&fields.password)
        .bind(&fields.url)
        .bind(&fields.notes)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(id, owner_id).await
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vault_items WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
