/// Bearer token authentication for Axum
///
/// The gate reads `Authorization: Bearer <token>`, resolves the token through
/// [`TokenIssuer::resolve`] and inserts an [`AuthContext`] into the request
/// extensions. Any failure short-circuits with a 401 before the handler runs.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Router};
/// use tasklist_shared::auth::middleware::{bearer_auth_middleware, AuthContext};
/// use tasklist_shared::auth::token::TokenIssuer;
/// use tasklist_shared::store::{MemoryStore, Store};
///
/// async fn whoami(auth: AuthContext) -> String {
///     auth.user_id.to_string()
/// }
///
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// let issuer = TokenIssuer::new();
///
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(move |req, next| {
///         bearer_auth_middleware(store.clone(), issuer.clone(), req, next)
///     }));
/// ```

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use super::token::TokenIssuer;
use crate::store::{Store, StoreError, TokenStore, UserStore};

/// Identity attached to an authenticated request
///
/// Handlers take it as an extractor and pass `user_id` on to the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user
    pub user_id: Uuid,

    /// Token the request was made with
    pub token_id: Uuid,
}

/// Error type for the authentication gate
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not a usable bearer value
    #[error("{0}")]
    InvalidFormat(String),

    /// Token malformed, unknown, expired, or owned by a missing user
    #[error("{0}")]
    InvalidToken(String),

    /// Store failed while resolving the token
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Store(e) => {
                error!(error = %e, "Store failure during authentication");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "internal_error",
                        "message": "An internal error occurred",
                    })),
                )
                    .into_response()
            }
            // Which of the 401 cases applied is not revealed
            _ => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "unauthorized",
                    "message": "Unauthenticated.",
                })),
            )
                .into_response(),
        }
    }
}

/// Pulls the bearer value out of the `Authorization` header
///
/// The scheme is matched case-insensitively; the token itself is returned
/// with surrounding whitespace trimmed.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid UTF-8".to_string()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidFormat("Expected Bearer token".to_string()));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

/// Resolves request headers to an [`AuthContext`]
pub async fn authenticate<S>(
    store: &S,
    issuer: &TokenIssuer,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError>
where
    S: TokenStore + UserStore + ?Sized,
{
    let presented = extract_bearer_token(headers)?;
    let (token, user) = issuer.resolve(store, presented).await?;

    Ok(AuthContext {
        user_id: user.id,
        token_id: token.id,
    })
}

/// Authentication middleware
///
/// Inserts [`AuthContext`] into the request extensions on success.
///
/// # Errors
///
/// 401 for missing, malformed, unknown or expired credentials; 500 if the
/// store fails.
pub async fn bearer_auth_middleware(
    store: Arc<dyn Store>,
    issuer: TokenIssuer,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth = authenticate(store.as_ref(), &issuer, req.headers())
        .await
        .inspect_err(|e| {
            if !matches!(e, AuthError::Store(_)) {
                debug!(reason = %e, path = %req.uri().path(), "Rejected unauthenticated request");
            }
        })?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only present on routes behind the gate
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingCredentials)
    }
}
