/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: opaque bearer token generation, hashing, issue and resolve
/// - [`middleware`]: bearer header parsing and the per-request [`middleware::AuthContext`]
/// - [`authorization`]: task ownership policy
///
/// # Flow
///
/// ```text
/// POST /login ──> verify_password ──> TokenIssuer::issue ──> plaintext token (shown once)
///
/// request ──> Authorization: Bearer <token>
///         ──> middleware::authenticate ──> TokenIssuer::resolve ──> AuthContext
///         ──> handler ──> service(user_id, ...) ──> authorization::authorize
/// ```

pub mod authorization;
pub mod middleware;
pub mod password;
pub mod token;
