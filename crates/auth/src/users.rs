//! User accounts: registration and login.
//!
//! Emails are normalized once at the door and never change. The normalized
//! email doubles as the vault key-derivation identity, so an email update
//! would orphan every item encrypted under the old key; no such operation
//! exists.

use {
    argon2::Argon2,
    lockstash_config::AuthConfig,
    lockstash_vault::normalize_email,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
    serde::Serialize,
    sqlx::SqlitePool,
};

use crate::error::{AuthError, Result};

/// A registered account. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: String,
}

/// SQLite-backed account store.
pub struct UserStore {
    pool: SqlitePool,
    min_password_len: usize,
}

impl UserStore {
    /// Create a store with the default password policy.
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        Self::with_config(pool, &AuthConfig::default()).await
    }

    /// Create a store with an explicit auth config.
    pub async fn with_config(pool: SqlitePool, config: &AuthConfig) -> Result<Self> {
        let store = Self {
            pool,
            min_password_len: config.min_password_len,
        };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                email         TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at    TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at    TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Register a new account.
    ///
    /// The email is normalized (trimmed, lowercased) before the uniqueness
    /// check, so `Alice@X.com` and `alice@x.com` are the same account.
    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        if !is_plausible_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < self.min_password_len {
            return Err(AuthError::WeakPassword {
                min: self.min_password_len,
            });
        }

        let hash = hash_password(password)?;
        let result = sqlx::query("INSERT INTO users (email, password_hash) VALUES (?, ?)")
            .bind(&email)
            .bind(&hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                    AuthError::EmailTaken
                } else {
                    AuthError::Database(e)
                }
            })?;

        let id = result.last_insert_rowid();
        tracing::info!(user_id = id, "account registered");

        self.get(id)
            .await?
            .ok_or(AuthError::Database(sqlx::Error::RowNotFound))
    }

    /// Verify a login attempt.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn verify_login(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, password_hash FROM users WHERE email = ?")
                .bind(&email)
                .fetch_optional(&self.pool)
                .await?;

        let Some((id, hash)) = row else {
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &hash) {
            return Err(AuthError::InvalidCredentials);
        }

        self.get(id).await?.ok_or(AuthError::InvalidCredentials)
    }

    /// Fetch an account by id.
    pub async fn get(&self, id: i64) -> Result<Option<User>> {
        let row: Option<(i64, String, String)> = sqlx::query_as(
            "SELECT id, email, strftime('%Y-%m-%dT%H:%M:%SZ', created_at)
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, email, created_at)| User {
            id,
            email,
            created_at,
        }))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Minimal shape check: `local@domain.tld`.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash_str: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash_str) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> UserStore {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        UserStore::new(pool).await.unwrap()
    }

    #[tokio::test]
    async fn register_then_login() {
        let store = test_store().await;

        let user = store
            .register("dev@example.com", "hunter2hunter2")
            .await
            .unwrap();
        assert!(user.id > 0);
        assert_eq!(user.email, "dev@example.com");

        let logged_in = store
            .verify_login("dev@example.com", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn email_is_normalized_at_registration() {
        let store = test_store().await;

        let user = store
            .register("  Dev@Example.COM ", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(user.email, "dev@example.com");

        // Login with yet another casing still resolves.
        let logged_in = store
            .verify_login("DEV@EXAMPLE.COM", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_email_rejected_case_insensitively() {
        let store = test_store().await;

        store
            .register("dev@example.com", "hunter2hunter2")
            .await
            .unwrap();
        let result = store.register("Dev@Example.com", "otherpassword").await;
        assert!(matches!(result, Err(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_identical() {
        let store = test_store().await;
        store
            .register("dev@example.com", "hunter2hunter2")
            .await
            .unwrap();

        let wrong_password = store.verify_login("dev@example.com", "wrong").await;
        let unknown_email = store.verify_login("ghost@example.com", "whatever").await;
        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let store = test_store().await;
        let result = store.register("dev@example.com", "short").await;
        assert!(matches!(result, Err(AuthError::WeakPassword { min: 8 })));
    }

    #[tokio::test]
    async fn implausible_emails_rejected() {
        let store = test_store().await;
        for email in ["", "no-at-sign", "@example.com", "dev@", "dev@nodot"] {
            let result = store.register(email, "hunter2hunter2").await;
            assert!(
                matches!(result, Err(AuthError::InvalidEmail)),
                "accepted {email:?}"
            );
        }
    }

    #[tokio::test]
    async fn stored_hash_is_not_the_password() {
        let store = test_store().await;
        let user = store
            .register("dev@example.com", "hunter2hunter2")
            .await
            .unwrap();

        let (hash,): (String,) =
            sqlx::query_as("SELECT password_hash FROM users WHERE id = ?")
                .bind(user.id)
                .fetch_one(&store.pool)
                .await
                .unwrap();
        assert_ne!(hash, "hunter2hunter2");
        assert!(hash.starts_with("$argon2"));
    }
}
