/// Opaque bearer tokens
///
/// Tokens are random strings handed to a client at login. Only their SHA-256
/// hash is stored, so a leaked database does not leak usable credentials, and
/// lookups are a plain equality match on the hash.
///
/// # Format
///
/// `tl_` followed by 48 base62 characters (`[A-Za-z0-9]`), 51 characters in
/// total. 62^48 is roughly 2^285, well above 32 bytes of entropy.
///
/// # Example
///
/// ```
/// use tasklist_shared::auth::token::{generate_token, hash_token, validate_token_format};
///
/// let (token, hash) = generate_token();
/// assert!(token.starts_with("tl_"));
/// assert!(validate_token_format(&token));
/// assert_eq!(hash, hash_token(&token));
/// ```

use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::middleware::AuthError;
use crate::models::{
    access_token::{AccessToken, CreateAccessToken},
    user::User,
};
use crate::store::{StoreError, TokenStore, UserStore};

/// Token prefix, makes leaked tokens easy to grep for
pub const TOKEN_PREFIX: &str = "tl_";

/// Length of the random part
const TOKEN_RANDOM_LENGTH: usize = 48;

/// Total token length
pub const TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a new token
///
/// Returns `(plaintext, sha256_hex)`. Randomness comes from the operating
/// system CSPRNG.
pub fn generate_token() -> (String, String) {
    let random: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_RANDOM_LENGTH)
        .map(char::from)
        .collect();

    let token = format!("{}{}", TOKEN_PREFIX, random);
    let hash = hash_token(&token);

    (token, hash)
}

/// Hex-encoded SHA-256 of a token (64 characters)
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Checks prefix, length and alphabet without touching storage
pub fn validate_token_format(token: &str) -> bool {
    token.len() == TOKEN_LENGTH
        && token
            .strip_prefix(TOKEN_PREFIX)
            .is_some_and(|random| random.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// A token right after issue, with the only copy of its plaintext
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Stored record
    pub token: AccessToken,

    /// Bearer value to hand to the client; not recoverable later
    pub plaintext: String,
}

/// Issues and resolves access tokens
#[derive(Debug, Clone, Default)]
pub struct TokenIssuer {
    ttl: Option<Duration>,
}

impl TokenIssuer {
    /// Issuer for tokens that never expire
    pub fn new() -> Self {
        Self::default()
    }

    /// Issuer whose tokens expire `ttl` after issue
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }

    /// Creates and persists a token for `user`
    ///
    /// # Errors
    ///
    /// Fails only if the store fails. A hash collision would surface as
    /// [`StoreError::Conflict`], which at 2^285 possible values is not a
    /// practical concern.
    pub async fn issue<S>(&self, store: &S, user: &User, name: &str) -> Result<IssuedToken, StoreError>
    where
        S: TokenStore + ?Sized,
    {
        let (plaintext, token_hash) = generate_token();

        let token = store
            .create_token(CreateAccessToken {
                user_id: user.id,
                name: name.to_string(),
                token_hash,
                expires_at: self.ttl.map(|ttl| Utc::now() + ttl),
            })
            .await?;

        debug!(user_id = %user.id, token_id = %token.id, name, "Issued access token");

        Ok(IssuedToken { token, plaintext })
    }

    /// Resolves a presented bearer value to its token and user
    ///
    /// Read-only: nothing is written on success or failure.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidToken`] if the value is malformed, unknown,
    ///   expired, or its user is gone
    /// - [`AuthError::Store`] if the store fails
    pub async fn resolve<S>(&self, store: &S, presented: &str) -> Result<(AccessToken, User), AuthError>
    where
        S: TokenStore + UserStore + ?Sized,
    {
        if !validate_token_format(presented) {
            return Err(AuthError::InvalidToken("Malformed token".to_string()));
        }

        let token = store
            .find_token_by_hash(&hash_token(presented))
            .await?
            .ok_or_else(|| AuthError::InvalidToken("Unknown token".to_string()))?;

        if token.is_expired() {
            return Err(AuthError::InvalidToken("Token expired".to_string()));
        }

        let user = store
            .find_user_by_id(token.user_id)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("Unknown token".to_string()))?;

        Ok((token, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::CreateUser;
    use crate::store::MemoryStore;

    async fn user(store: &MemoryStore, email: &str) -> User {
        store
            .create_user(CreateUser {
                name: "Token Owner".to_string(),
                email: email.to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    #[test]
    fn test_generate_token() {
        let (first, first_hash) = generate_token();
        let (second, second_hash) = generate_token();

        assert_eq!(first.len(), TOKEN_LENGTH);
        assert!(first.starts_with(TOKEN_PREFIX));
        assert_ne!(first, second);
        assert_ne!(first_hash, second_hash);
        assert_eq!(first_hash.len(), 64);
    }

    #[test]
    fn test_hash_token_is_deterministic_hex() {
        let hash = hash_token("tl_example");
        assert_eq!(hash, hash_token("tl_example"));
        assert_ne!(hash, hash_token("tl_examplf"));
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_validate_token_format() {
        let (token, _) = generate_token();
        assert!(validate_token_format(&token));

        assert!(!validate_token_format(""));
        assert!(!validate_token_format("tl_short"));
        assert!(!validate_token_format(&token.replacen("tl_", "xx_", 1)));
        assert!(!validate_token_format(&format!("{}a", token)));
        assert!(!validate_token_format(&format!("tl_{}", "!".repeat(48))));
        // Multi-byte characters must not sneak past the byte-length check
        assert!(!validate_token_format(&format!("tl_{}é", "a".repeat(46))));
    }

    #[tokio::test]
    async fn test_issue_stores_only_the_hash() {
        let store = MemoryStore::new();
        let owner = user(&store, "owner@example.com").await;

        let issued = TokenIssuer::new().issue(&store, &owner, "api_token").await.unwrap();

        assert_eq!(issued.token.user_id, owner.id);
        assert_eq!(issued.token.name, "api_token");
        assert_eq!(issued.token.token_hash, hash_token(&issued.plaintext));
        assert_ne!(issued.token.token_hash, issued.plaintext);
        assert!(issued.token.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_resolve_returns_owner() {
        let store = MemoryStore::new();
        let owner = user(&store, "owner@example.com").await;
        let issuer = TokenIssuer::new();

        let issued = issuer.issue(&store, &owner, "api_token").await.unwrap();
        let (token, resolved) = issuer.resolve(&store, &issued.plaintext).await.unwrap();

        assert_eq!(token.id, issued.token.id);
        assert_eq!(resolved.id, owner.id);
    }

    #[tokio::test]
    async fn test_each_issue_yields_a_distinct_token() {
        let store = MemoryStore::new();
        let owner = user(&store, "owner@example.com").await;
        let issuer = TokenIssuer::new();

        let first = issuer.issue(&store, &owner, "api_token").await.unwrap();
        let second = issuer.issue(&store, &owner, "api_token").await.unwrap();

        assert_ne!(first.plaintext, second.plaintext);
        assert!(issuer.resolve(&store, &first.plaintext).await.is_ok());
        assert!(issuer.resolve(&store, &second.plaintext).await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_rejects_unknown_and_malformed() {
        let store = MemoryStore::new();
        let issuer = TokenIssuer::new();
        let (never_issued, _) = generate_token();

        assert!(matches!(
            issuer.resolve(&store, &never_issued).await,
            Err(AuthError::InvalidToken(_))
        ));
        assert!(matches!(
            issuer.resolve(&store, "garbage").await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_rejects_expired_token() {
        let store = MemoryStore::new();
        let owner = user(&store, "owner@example.com").await;
        let issuer = TokenIssuer::with_ttl(Duration::seconds(-1));

        let issued = issuer.issue(&store, &owner, "api_token").await.unwrap();
        assert!(issued.token.expires_at.is_some());

        assert!(matches!(
            issuer.resolve(&store, &issued.plaintext).await,
            Err(AuthError::InvalidToken(msg)) if msg == "Token expired"
        ));
    }

    #[tokio::test]
    async fn test_resolve_surfaces_store_failure() {
        let store = MemoryStore::new();
        let (token, _) = generate_token();
        store.set_available(false);

        assert!(matches!(
            TokenIssuer::new().resolve(&store, &token).await,
            Err(AuthError::Store(_))
        ));
    }
}
