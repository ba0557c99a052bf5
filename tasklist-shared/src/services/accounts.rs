/// Registration and login
///
/// Registration stores an Argon2id hash of the password; login verifies it
/// and issues a fresh bearer token. Login failures never say whether the
/// email or the password was wrong.

use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

use crate::auth::password::{self, PasswordError};
use crate::auth::token::{IssuedToken, TokenIssuer};
use crate::models::user::{CreateUser, User};
use crate::store::{StoreError, TokenStore, UserStore};
use crate::validation::FieldErrors;

/// Name given to tokens issued by [`login`]
pub const LOGIN_TOKEN_NAME: &str = "api_token";

const EMAIL_TAKEN: &str = "The email has already been taken.";

/// Error type for account operations
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Input rejected
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Unknown email or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Hashing failed or a stored hash is unreadable
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Unexpected store failure
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            // Lost a race with a concurrent registration of the same email
            StoreError::Conflict(_) => AccountError::Validation(FieldErrors::single("email", EMAIL_TAKEN)),
            other => AccountError::Store(other),
        }
    }
}

impl From<validator::ValidationErrors> for AccountError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AccountError::Validation(errors.into())
    }
}

/// Registration request body
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(
        required(message = "The name field is required."),
        length(min = 1, max = 255, message = "The name field must be between 1 and 255 characters.")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "The email field is required."),
        email(message = "The email field must be a valid email address."),
        length(max = 255, message = "The email field must not be greater than 255 characters.")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "The password field is required."),
        length(min = 8, message = "The password field must be at least 8 characters.")
    )]
    pub password: Option<String>,
}

/// Login request body
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(
        required(message = "The email field is required."),
        email(message = "The email field must be a valid email address.")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "The password field is required."),
        length(min = 1, message = "The password field is required.")
    )]
    pub password: Option<String>,
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: IssuedToken,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Creates a user account
///
/// # Errors
///
/// - [`AccountError::Validation`] for missing or malformed fields, or an
///   email that is already registered (compared case-insensitively)
/// - [`AccountError::Password`] / [`AccountError::Store`] for internal faults
pub async fn register<S>(store: &S, input: RegisterInput) -> Result<User, AccountError>
where
    S: UserStore + ?Sized,
{
    let input = RegisterInput {
        name: trimmed(input.name),
        email: trimmed(input.email),
        password: input.password,
    };
    input.validate()?;

    let (Some(name), Some(email), Some(plain)) = (input.name, input.email, input.password) else {
        return Err(AccountError::Validation(FieldErrors::single(
            "email",
            "The email field is required.",
        )));
    };

    if store.find_user_by_email(&email).await?.is_some() {
        debug!(email = %email, "Registration rejected: email taken");
        return Err(AccountError::Validation(FieldErrors::single("email", EMAIL_TAKEN)));
    }

    let password_hash = password::hash_password(&plain)?;

    let user = store
        .create_user(CreateUser {
            name,
            email,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// Checks credentials and issues a new token named [`LOGIN_TOKEN_NAME`]
///
/// # Errors
///
/// - [`AccountError::Validation`] if a field is missing or the email is malformed
/// - [`AccountError::InvalidCredentials`] for an unknown email or wrong password
pub async fn login<S>(
    store: &S,
    issuer: &TokenIssuer,
    input: LoginInput,
) -> Result<LoginOutcome, AccountError>
where
    S: UserStore + TokenStore + ?Sized,
{
    let input = LoginInput {
        email: trimmed(input.email),
        password: input.password,
    };
    input.validate()?;

    let (Some(email), Some(plain)) = (input.email, input.password) else {
        return Err(AccountError::InvalidCredentials);
    };

    let Some(user) = store.find_user_by_email(&email).await? else {
        debug!("Login failed: unknown email");
        return Err(AccountError::InvalidCredentials);
    };

    if !password::verify_password(&plain, &user.password_hash)? {
        debug!(user_id = %user.id, "Login failed: wrong password");
        return Err(AccountError::InvalidCredentials);
    }

    let token = issuer.issue(store, &user, LOGIN_TOKEN_NAME).await?;
    info!(user_id = %user.id, token_id = %token.token.id, "User logged in");

    Ok(LoginOutcome { user, token })
}
