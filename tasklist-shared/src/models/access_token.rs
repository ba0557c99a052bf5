/// Personal access token model and database operations
///
/// A token row binds a SHA-256 hash of a bearer value to a user. The
/// plaintext value is handed to the client once, at issue time, and is never
/// stored. See [`crate::auth::token`] for generation and resolution.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE access_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     token_hash CHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Stored access token
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessToken {
    /// Unique token ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Label given at issue time (e.g. "api_token")
    pub name: String,

    /// Hex SHA-256 of the plaintext bearer value
    #[serde(skip_serializing, default)]
    pub token_hash: String,

    /// When the token was issued
    pub created_at: DateTime<Utc>,

    /// Optional expiry; `None` means the token lives until revoked
    pub expires_at: Option<DateTime<Utc>>,
}

/// Input for persisting a freshly generated token
#[derive(Debug, Clone)]
pub struct CreateAccessToken {
    pub user_id: Uuid,
    pub name: String,
    pub token_hash: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Returns true if `expires_at` is set and in the past
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= Utc::now())
    }

    /// Inserts a token row
    pub async fn create(pool: &PgPool, data: CreateAccessToken) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AccessToken>(
            r#"
            INSERT INTO access_tokens (user_id, name, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, token_hash, created_at, expires_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.token_hash)
        .bind(data.expires_at)
        .fetch_one(pool)
        .await
    }

    /// Looks a token up by the hash of its plaintext value
    pub async fn find_by_hash(pool: &PgPool, token_hash: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AccessToken>(
            r#"
            SELECT id, user_id, name, token_hash, created_at, expires_at
            FROM access_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }
}
