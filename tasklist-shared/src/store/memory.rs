/// In-memory storage backend
///
/// Keeps users, tokens and tasks in process memory behind a single
/// `tokio::sync::RwLock`. Each trait method takes the lock once, which gives
/// the same per-operation atomicity the Postgres backend gets from single
/// statements. Data is lost on restart.
///
/// Used by the test suites and by `DATABASE_URL=memory://` for local demos.
///
/// # Failure injection
///
/// [`MemoryStore::set_available`] makes every operation fail with
/// [`StoreError::Unavailable`], which lets tests exercise the internal-error
/// path without a real database.
///
/// # Example
///
/// ```
/// use tasklist_shared::models::task::NewTask;
/// use tasklist_shared::store::{MemoryStore, TaskStore};
/// use uuid::Uuid;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let owner = Uuid::new_v4();
///
/// store.create_task(NewTask {
///     user_id: owner,
///     title: "Buy bread".to_string(),
///     description: None,
/// }).await?;
///
/// assert_eq!(store.find_tasks_by_owner(owner).await?.len(), 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult, TaskStore, TokenStore, UserStore};
use crate::models::{
    access_token::{AccessToken, CreateAccessToken},
    task::{NewTask, Task, TaskStatus},
    user::{CreateUser, User},
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// Keyed by token hash
    tokens: HashMap<String, AccessToken>,
    /// Insertion order doubles as creation order
    tasks: Vec<Task>,
}

impl Tables {
    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
    }
}

/// Store backed by process memory
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggles failure injection; while unavailable every call errors
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Total number of tasks across all owners
    pub async fn task_count(&self) -> usize {
        self.tables.read().await.tasks.len()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store disabled".to_string()))
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if tables.user_by_email(&data.email).is_some() {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn upsert_user(&self, data: CreateUser) -> StoreResult<User> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        let existing = tables.user_by_email(&data.email).map(|user| user.id);
        let now = Utc::now();

        if let Some(user) = existing.and_then(|id| tables.users.get_mut(&id)) {
            user.name = data.name;
            user.password_hash = data.password_hash;
            user.updated_at = now;
            return Ok(user.clone());
        }

        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.check_available()?;
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check_available()?;
        Ok(self.tables.read().await.user_by_email(email).cloned())
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn create_token(&self, data: CreateAccessToken) -> StoreResult<AccessToken> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if tables.tokens.contains_key(&data.token_hash) {
            return Err(StoreError::Conflict("access_tokens_token_hash_key".to_string()));
        }

        let token = AccessToken {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            name: data.name,
            token_hash: data.token_hash,
            created_at: Utc::now(),
            expires_at: data.expires_at,
        };
        tables.tokens.insert(token.token_hash.clone(), token.clone());

        Ok(token)
    }

    async fn find_token_by_hash(&self, token_hash: &str) -> StoreResult<Option<AccessToken>> {
        self.check_available()?;
        Ok(self.tables.read().await.tokens.get(token_hash).cloned())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        self.check_available()?;
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            status: TaskStatus::Pending,
            user_id: data.user_id,
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_task_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|task| task.id == id).cloned())
    }

    async fn find_tasks_by_owner(&self, user_id: Uuid) -> StoreResult<Vec<Task>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_tasks_by_owner_and_status(
        &self,
        user_id: Uuid,
        status: TaskStatus,
    ) -> StoreResult<Vec<Task>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|task| task.user_id == user_id && task.status == status)
            .cloned()
            .collect())
    }

    async fn update_task_status(&self, id: Uuid, status: TaskStatus) -> StoreResult<Option<Task>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        Ok(tables.tasks.iter_mut().find(|task| task.id == id).map(|task| {
            task.status = status;
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        let before = tables.tasks.len();
        tables.tasks.retain(|task| task.id != id);
        Ok(tables.tasks.len() < before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }
}
