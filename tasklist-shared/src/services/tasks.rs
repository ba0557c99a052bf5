/// Task operations
///
/// [`TaskService`] is a thin, borrow-only wrapper around a [`TaskStore`].
/// Reads are scoped to the caller in the query itself; writes to an existing
/// task go through a fixed sequence:
///
/// ```text
/// find_task_by_id ──None──> NotFound (404)
///        │
///   authorize ──denied──> Forbidden (403)
///        │
///   validate input ──invalid──> Validation (422)
///        │
///   store write
/// ```
///
/// Task inputs keep their fields as raw JSON values so that a wrong type
/// becomes a per-field message rather than a body-level parse failure.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::authorization::{authorize, AuthzError, TaskAction};
use crate::models::task::{NewTask, Task, TaskStatus, MAX_TITLE_LENGTH};
use crate::store::{StoreError, TaskStore};
use crate::validation::FieldErrors;

const INVALID_STATUS: &str = "The selected status is invalid.";

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Input rejected; nothing was written
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// No task with this ID
    #[error("Task {0} not found")]
    NotFound(Uuid),

    /// Task exists but belongs to someone else
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// Unexpected store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Body of a create request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTaskInput {
    #[serde(default)]
    pub title: Option<Value>,

    #[serde(default)]
    pub description: Option<Value>,
}

/// Body of a status update request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStatusInput {
    #[serde(default)]
    pub status: Option<Value>,
}

impl CreateTaskInput {
    /// Convenience constructor for callers that already hold strings
    pub fn new(title: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            title: Some(Value::String(title.into())),
            description: description.map(|d| Value::String(d.to_string())),
        }
    }

    /// Checks the input and builds the row to insert
    ///
    /// Strings are trimmed; a blank description is stored as `None`.
    fn validate(self, owner: Uuid) -> Result<NewTask, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = match self.title {
            None => {
                errors.add("title", "The title field is required.");
                None
            }
            Some(Value::String(title)) => {
                let title = title.trim();
                if title.is_empty() {
                    errors.add("title", "The title field is required.");
                } else if title.chars().count() > MAX_TITLE_LENGTH {
                    errors.add(
                        "title",
                        format!(
                            "The title field must not be greater than {} characters.",
                            MAX_TITLE_LENGTH
                        ),
                    );
                }
                Some(title.to_string())
            }
            Some(_) => {
                errors.add("title", "The title field must be a string.");
                None
            }
        };

        let description = match self.description {
            None => None,
            Some(Value::String(description)) => {
                let description = description.trim();
                (!description.is_empty()).then(|| description.to_string())
            }
            Some(_) => {
                errors.add("description", "The description field must be a string.");
                None
            }
        };

        errors.into_result()?;

        match title {
            Some(title) => Ok(NewTask {
                user_id: owner,
                title,
                description,
            }),
            None => Err(FieldErrors::single("title", "The title field is required.")),
        }
    }
}

impl UpdateStatusInput {
    pub fn new(status: &str) -> Self {
        Self {
            status: Some(Value::String(status.to_string())),
        }
    }

    fn validate(&self) -> Result<TaskStatus, FieldErrors> {
        match &self.status {
            None => Err(FieldErrors::single("status", "The status field is required.")),
            Some(Value::String(status)) => TaskStatus::parse(status)
                .ok_or_else(|| FieldErrors::single("status", INVALID_STATUS)),
            Some(_) => Err(FieldErrors::single("status", INVALID_STATUS)),
        }
    }
}

/// Parses a status path segment, reporting a `status` field error on failure
pub fn parse_status(value: &str) -> Result<TaskStatus, FieldErrors> {
    TaskStatus::parse(value).ok_or_else(|| FieldErrors::single("status", INVALID_STATUS))
}

/// Task operations for one request
pub struct TaskService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> TaskService<'a, S>
where
    S: TaskStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// All tasks of `owner`, oldest first
    pub async fn list(&self, owner: Uuid) -> Result<Vec<Task>, TaskError> {
        Ok(self.store.find_tasks_by_owner(owner).await?)
    }

    /// Creates a `pending` task owned by `owner`
    ///
    /// # Errors
    ///
    /// [`TaskError::Validation`] if `title` is missing, not a string, blank
    /// or longer than 255 characters, or if `description` is present but not
    /// a string. No row is written in that case.
    pub async fn create(&self, owner: Uuid, input: CreateTaskInput) -> Result<Task, TaskError> {
        let new_task = input.validate(owner).map_err(|errors| {
            debug!(user_id = %owner, ?errors, "Rejected task creation");
            TaskError::Validation(errors)
        })?;

        let task = self.store.create_task(new_task).await?;
        info!(user_id = %owner, task_id = %task.id, "Task created");

        Ok(task)
    }

    /// Sets the status of a task owned by `owner`
    ///
    /// Checks run in order: existence, ownership, then the status value. The
    /// stored status is untouched on any failure.
    pub async fn update_status(
        &self,
        owner: Uuid,
        id: Uuid,
        input: UpdateStatusInput,
    ) -> Result<Task, TaskError> {
        let task = self.owned_task(owner, id, TaskAction::Update).await?;

        let status = input.validate().map_err(|errors| {
            debug!(user_id = %owner, task_id = %id, ?errors, "Rejected status update");
            TaskError::Validation(errors)
        })?;

        // A concurrent delete between lookup and update surfaces as 404
        let updated = self
            .store
            .update_task_status(task.id, status)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        info!(
            user_id = %owner,
            task_id = %id,
            from = %task.status,
            to = %updated.status,
            "Task status updated"
        );

        Ok(updated)
    }

    /// Deletes a task owned by `owner`
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), TaskError> {
        let task = self.owned_task(owner, id, TaskAction::Delete).await?;

        if !self.store.delete_task(task.id).await? {
            return Err(TaskError::NotFound(id));
        }

        info!(user_id = %owner, task_id = %id, "Task deleted");
        Ok(())
    }

    /// Tasks of `owner` with the given status, oldest first
    ///
    /// # Errors
    ///
    /// [`TaskError::Validation`] with a `status` message if `status` is not
    /// one of `pending`, `in_progress` or `completed`.
    pub async fn filter_by_status(&self, owner: Uuid, status: &str) -> Result<Vec<Task>, TaskError> {
        let status = parse_status(status).map_err(TaskError::Validation)?;

        Ok(self.store.find_tasks_by_owner_and_status(owner, status).await?)
    }

    async fn owned_task(&self, owner: Uuid, id: Uuid, action: TaskAction) -> Result<Task, TaskError> {
        let task = self
            .store
            .find_task_by_id(id)
            .await?
            .ok_or(TaskError::NotFound(id))?;

        authorize(owner, &task, action).inspect_err(|_| {
            debug!(user_id = %owner, task_id = %id, %action, "Ownership check denied");
        })?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn input(value: Value) -> CreateTaskInput {
        serde_json::from_value(value).unwrap()
    }

    fn validation_errors(result: Result<Task, TaskError>) -> FieldErrors {
        match result {
            Err(TaskError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_pending() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();

        let task = TaskService::new(&store)
            .create(owner, CreateTaskInput::new("Buy bread", Some("At the corner shop")))
            .await
            .unwrap();

        assert_eq!(task.user_id, owner);
        assert_eq!(task.title, "Buy bread");
        assert_eq!(task.description.as_deref(), Some("At the corner shop"));
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_trims_and_drops_blank_description() {
        let store = MemoryStore::new();

        let task = TaskService::new(&store)
            .create(Uuid::new_v4(), input(json!({"title": "  Walk  ", "description": "   "})))
            .await
            .unwrap();

        assert_eq!(task.title, "Walk");
        assert!(task.description.is_none());
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let store = MemoryStore::new();
        let service = TaskService::new(&store);
        let owner = Uuid::new_v4();

        for body in [json!({}), json!({"title": null}), json!({"title": "   "})] {
            let errors = validation_errors(service.create(owner, input(body)).await);
            assert_eq!(errors.get("title"), ["The title field is required."]);
        }

        assert_eq!(store.task_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_wrong_types_per_field() {
        let store = MemoryStore::new();

        let errors = validation_errors(
            TaskService::new(&store)
                .create(Uuid::new_v4(), input(json!({"title": 42, "description": ["x"]})))
                .await,
        );

        assert_eq!(errors.get("title"), ["The title field must be a string."]);
        assert_eq!(errors.get("description"), ["The description field must be a string."]);
        assert_eq!(store.task_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_title_length_limit_counts_characters() {
        let store = MemoryStore::new();
        let service = TaskService::new(&store);
        let owner = Uuid::new_v4();

        // 255 multi-byte characters is within the limit
        assert!(service
            .create(owner, CreateTaskInput::new("é".repeat(255), None))
            .await
            .is_ok());

        let errors = validation_errors(
            service
                .create(owner, CreateTaskInput::new("a".repeat(256), None))
                .await,
        );
        assert_eq!(
            errors.get("title"),
            ["The title field must not be greater than 255 characters."]
        );
        assert_eq!(store.task_count().await, 1);
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_owner() {
        let store = MemoryStore::new();
        let service = TaskService::new(&store);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        service.create(alice, CreateTaskInput::new("a1", None)).await.unwrap();
        service.create(bob, CreateTaskInput::new("b1", None)).await.unwrap();
        service.create(alice, CreateTaskInput::new("a2", None)).await.unwrap();

        let titles: Vec<_> = service
            .list(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.title)
            .collect();
        assert_eq!(titles, ["a1", "a2"]);
        assert!(service.list(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = MemoryStore::new();
        let service = TaskService::new(&store);
        let owner = Uuid::new_v4();
        let task = service.create(owner, CreateTaskInput::new("t", None)).await.unwrap();

        let updated = service
            .update_status(owner, task.id, UpdateStatusInput::new("in_progress"))
            .await
            .unwrap();

        assert_eq!(updated.id, task.id);
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert!(updated.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_value() {
        let store = MemoryStore::new();
        let service = TaskService::new(&store);
        let owner = Uuid::new_v4();
        let task = service.create(owner, CreateTaskInput::new("t", None)).await.unwrap();

        for status in [json!("done"), json!("PENDING"), json!(1), Value::Null] {
            let result = service
                .update_status(owner, task.id, UpdateStatusInput { status: Some(status) })
                .await;
            assert!(validation_errors(result).has("status"));
        }

        let missing = service
            .update_status(owner, task.id, UpdateStatusInput::default())
            .await;
        assert_eq!(
            validation_errors(missing).get("status"),
            ["The status field is required."]
        );

        let stored = store.find_task_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_other_user_cannot_update_or_delete() {
        let store = MemoryStore::new();
        let service = TaskService::new(&store);
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let task = service.create(owner, CreateTaskInput::new("mine", None)).await.unwrap();

        assert!(matches!(
            service
                .update_status(intruder, task.id, UpdateStatusInput::new("completed"))
                .await,
            Err(TaskError::Forbidden(_))
        ));
        assert!(matches!(
            service.delete(intruder, task.id).await,
            Err(TaskError::Forbidden(_))
        ));

        let stored = store.find_task_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(stored, task);
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found_before_validation() {
        let store = MemoryStore::new();
        let service = TaskService::new(&store);
        let owner = Uuid::new_v4();
        let missing = Uuid::new_v4();

        assert!(matches!(
            service
                .update_status(owner, missing, UpdateStatusInput::new("bogus"))
                .await,
            Err(TaskError::NotFound(id)) if id == missing
        ));
        assert!(matches!(
            service.delete(owner, missing).await,
            Err(TaskError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_forbidden_takes_precedence_over_invalid_status() {
        let store = MemoryStore::new();
        let service = TaskService::new(&store);
        let task = service
            .create(Uuid::new_v4(), CreateTaskInput::new("t", None))
            .await
            .unwrap();

        assert!(matches!(
            service
                .update_status(Uuid::new_v4(), task.id, UpdateStatusInput::new("bogus"))
                .await,
            Err(TaskError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let service = TaskService::new(&store);
        let owner = Uuid::new_v4();
        let task = service.create(owner, CreateTaskInput::new("t", None)).await.unwrap();

        service.delete(owner, task.id).await.unwrap();

        assert!(service.list(owner).await.unwrap().is_empty());
        assert!(matches!(
            service.delete(owner, task.id).await,
            Err(TaskError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_filter_by_status() {
        let store = MemoryStore::new();
        let service = TaskService::new(&store);
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let done = service.create(owner, CreateTaskInput::new("done", None)).await.unwrap();
        service.create(owner, CreateTaskInput::new("open", None)).await.unwrap();
        let foreign = service.create(other, CreateTaskInput::new("theirs", None)).await.unwrap();

        service
            .update_status(owner, done.id, UpdateStatusInput::new("completed"))
            .await
            .unwrap();
        service
            .update_status(other, foreign.id, UpdateStatusInput::new("completed"))
            .await
            .unwrap();

        let completed = service.filter_by_status(owner, "completed").await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, done.id);

        assert!(service.filter_by_status(owner, "in_progress").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_by_invalid_status() {
        let store = MemoryStore::new();

        match TaskService::new(&store).filter_by_status(Uuid::new_v4(), "archived").await {
            Err(TaskError::Validation(errors)) => {
                assert_eq!(errors.get("status"), [INVALID_STATUS]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let store = MemoryStore::new();
        store.set_available(false);

        assert!(matches!(
            TaskService::new(&store).list(Uuid::new_v4()).await,
            Err(TaskError::Store(StoreError::Unavailable(_)))
        ));
    }
}
