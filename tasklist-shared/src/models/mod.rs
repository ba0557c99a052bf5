/// Database models for Tasklist
///
/// Each model carries its row type, its creation input and the Postgres
/// queries that read and write it. Backend-independent access goes through
/// the traits in [`crate::store`].
///
/// # Models
///
/// - `user`: User accounts and credentials
/// - `access_token`: Personal access tokens (hashed bearer credentials)
/// - `task`: To-do items owned by a user

pub mod access_token;
pub mod task;
pub mod user;
