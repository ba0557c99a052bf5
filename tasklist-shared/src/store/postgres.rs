/// Postgres storage backend
///
/// Thin adapter from the [`Store`] traits to the query functions on the
/// models. Each trait method runs exactly one statement, so atomicity comes
/// from Postgres itself.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasklist_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
/// use tasklist_shared::store::{PgStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
/// run_migrations(&pool).await?;
///
/// let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreResult, TaskStore, TokenStore, UserStore};
use crate::db::pool::health_check;
use crate::models::{
    access_token::{AccessToken, CreateAccessToken},
    task::{NewTask, Task, TaskStatus},
    user::{CreateUser, User},
};

/// Store backed by a Postgres connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool (for migrations and shutdown)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn upsert_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::upsert_by_email(&self.pool, data).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }
}

#[async_trait]
impl TokenStore for PgStore {
    async fn create_token(&self, data: CreateAccessToken) -> StoreResult<AccessToken> {
        Ok(AccessToken::create(&self.pool, data).await?)
    }

    async fn find_token_by_hash(&self, token_hash: &str) -> StoreResult<Option<AccessToken>> {
        Ok(AccessToken::find_by_hash(&self.pool, token_hash).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn find_tasks_by_owner(&self, user_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::find_by_owner(&self.pool, user_id).await?)
    }

    async fn find_tasks_by_owner_and_status(
        &self,
        user_id: Uuid,
        status: TaskStatus,
    ) -> StoreResult<Vec<Task>> {
        Ok(Task::find_by_owner_and_status(&self.pool, user_id, status).await?)
    }

    async fn update_task_status(&self, id: Uuid, status: TaskStatus) -> StoreResult<Option<Task>> {
        Ok(Task::update_status(&self.pool, id, status).await?)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
