/// Storage abstraction
///
/// The service layer talks to storage through three narrow traits, one per
/// aggregate, so that every query is explicit and owner-parameterized:
///
/// - [`UserStore`]: credential records
/// - [`TokenStore`]: hashed access tokens
/// - [`TaskStore`]: owner-scoped task records
///
/// [`Store`] bundles them behind one object-safe trait so the API server can
/// hold a single `Arc<dyn Store>`.
///
/// # Backends
///
/// - [`postgres::PgStore`]: sqlx/Postgres, used in production
/// - [`memory::MemoryStore`]: in-process maps, used by tests and `memory://`
///
/// Every operation is a single statement (or a single lock acquisition for
/// the in-memory backend); uniqueness of emails and token hashes is enforced
/// by the backend and reported as [`StoreError::Conflict`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    access_token::{AccessToken, CreateAccessToken},
    task::{NewTask, Task, TaskStatus},
    user::{CreateUser, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint was violated (the payload names the constraint)
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// The backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                StoreError::Conflict(constraint)
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Storage result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// User records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user; a taken email is [`StoreError::Conflict`]
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Inserts a user or updates name and password hash of the one with the same email
    async fn upsert_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Case-insensitive email lookup
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

/// Access token records
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn create_token(&self, data: CreateAccessToken) -> StoreResult<AccessToken>;

    async fn find_token_by_hash(&self, token_hash: &str) -> StoreResult<Option<AccessToken>>;
}

/// Task records
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a `pending` task
    async fn create_task(&self, data: NewTask) -> StoreResult<Task>;

    /// Looks a task up by ID regardless of owner
    async fn find_task_by_id(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Every task of `user_id`, oldest first
    async fn find_tasks_by_owner(&self, user_id: Uuid) -> StoreResult<Vec<Task>>;

    /// Tasks of `user_id` with `status`, oldest first
    async fn find_tasks_by_owner_and_status(
        &self,
        user_id: Uuid,
        status: TaskStatus,
    ) -> StoreResult<Vec<Task>>;

    /// Sets the status; `None` if the task does not exist
    async fn update_task_status(&self, id: Uuid, status: TaskStatus) -> StoreResult<Option<Task>>;

    /// Removes a task; false if it did not exist
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;
}

/// Complete storage backend
#[async_trait]
pub trait Store: UserStore + TokenStore + TaskStore {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}
