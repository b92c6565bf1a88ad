//! Opaque bearer-token sessions.
//!
//! A token is 32 random bytes, url-safe base64. The token itself carries no
//! claims; everything lives in the session row, which joins to the user at
//! resolution time.

use {lockstash_config::AuthConfig, lockstash_vault::Principal, sqlx::SqlitePool};

use crate::error::{AuthError, Result};

/// SQLite-backed session store.
pub struct SessionStore {
    pool: SqlitePool,
    ttl_days: i64,
}

impl SessionStore {
    /// Create a store with the default session lifetime.
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        Self::with_config(pool, &AuthConfig::default()).await
    }

    /// Create a store with an explicit auth config.
    pub async fn with_config(pool: SqlitePool, config: &AuthConfig) -> Result<Self> {
        let store = Self {
            pool,
            ttl_days: config.session_ttl_days,
        };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS auth_sessions (
                token      TEXT PRIMARY KEY,
                user_id    INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                expires_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Create a session for a user. Returns the bearer token.
    pub async fn create(&self, user_id: i64) -> Result<String> {
        let token = generate_token();
        sqlx::query(
            "INSERT INTO auth_sessions (token, user_id, expires_at)
             VALUES (?, ?, datetime('now', ?))",
        )
        .bind(&token)
        .bind(user_id)
        .bind(format!("+{} days", self.ttl_days))
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id, "session created");
        Ok(token)
    }

    /// Resolve a token to the authenticated principal.
    ///
    /// The joined email is the one fixed at registration, already
    /// normalized for key derivation.
    pub async fn resolve(&self, token: &str) -> Result<Principal> {
        let row: Option<(i64, String)> = sqlx::query_as(
            "SELECT s.user_id, u.email
             FROM auth_sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.token = ? AND s.expires_at > datetime('now')",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(user_id, email)| Principal { user_id, email })
            .ok_or(AuthError::InvalidSession)
    }

    /// Delete a session (logout). Unknown tokens are a no-op.
    pub async fn delete(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove expired sessions. Returns how many were deleted.
    pub async fn cleanup_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= datetime('now')")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn generate_token() -> String {
    use {base64::Engine, rand::RngCore};

    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
