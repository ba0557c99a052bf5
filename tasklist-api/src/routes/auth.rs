/// Registration and login endpoints
///
/// # Endpoints
///
/// - `POST /register` - Create an account, 201 with the user
/// - `POST /login` - Exchange credentials for a bearer token
///
/// Validation failures answer 422 with per-field messages. A failed login
/// answers 401 `invalid credentials` without saying which field was wrong.

use crate::{app::AppState, error::ApiResult, extract::AppJson};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tasklist_shared::{
    models::user::User,
    services::{accounts, LoginInput, RegisterInput},
};

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,

    /// Bearer token; shown only here
    pub token: String,

    pub user: User,
}

/// Register handler
///
/// # Example
///
/// ```text
/// POST /register
/// { "name": "Ana", "email": "ana@example.com", "password": "password123" }
/// ```
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterInput>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = accounts::register(state.store.as_ref(), input).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login handler
///
/// Every successful login issues a new token; earlier tokens stay valid.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginInput>,
) -> ApiResult<Json<LoginResponse>> {
    let outcome = accounts::login(state.store.as_ref(), &state.issuer, input).await?;

    Ok(Json(LoginResponse {
        message: "Login successful.",
        token: outcome.token.plaintext,
        user: outcome.user,
    }))
}
