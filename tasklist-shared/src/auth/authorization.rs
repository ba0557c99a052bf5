/// Task ownership policy
///
/// A user may update or delete only tasks they own. Listing and filtering
/// need no check here because those queries are already scoped to the
/// caller's `user_id`.
///
/// # Example
///
/// ```
/// use tasklist_shared::auth::authorization::{authorize, TaskAction};
/// # use tasklist_shared::models::task::{Task, TaskStatus};
/// # use chrono::Utc;
/// # use uuid::Uuid;
///
/// # let owner = Uuid::new_v4();
/// # let task = Task {
/// #     id: Uuid::new_v4(),
/// #     title: "Write report".to_string(),
/// #     description: None,
/// #     status: TaskStatus::Pending,
/// #     user_id: owner,
/// #     created_at: Utc::now(),
/// #     updated_at: Utc::now(),
/// # };
/// assert!(authorize(owner, &task, TaskAction::Delete).is_ok());
/// assert!(authorize(Uuid::new_v4(), &task, TaskAction::Delete).is_err());
/// ```

use std::fmt;

use uuid::Uuid;

use crate::models::task::Task;

/// Actions subject to the ownership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Update,
    Delete,
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskAction::Update => f.write_str("update"),
            TaskAction::Delete => f.write_str("delete"),
        }
    }
}

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller does not own the task
    #[error("Not authorized to {action} task {task_id}")]
    NotOwner { task_id: Uuid, action: TaskAction },
}

/// Returns true if `user_id` may perform `action` on `task`
pub fn can_access(user_id: Uuid, task: &Task, action: TaskAction) -> bool {
    match action {
        TaskAction::Update | TaskAction::Delete => task.is_owned_by(user_id),
    }
}

/// [`can_access`] as a `Result`, for use with `?`
pub fn authorize(user_id: Uuid, task: &Task, action: TaskAction) -> Result<(), AuthzError> {
    if can_access(user_id, task, action) {
        Ok(())
    } else {
        Err(AuthzError::NotOwner {
            task_id: task.id,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;
    use chrono::Utc;

    fn task_owned_by(user_id: Uuid) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Owned".to_string(),
            description: None,
            status: TaskStatus::Pending,
            user_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_may_update_and_delete() {
        let owner = Uuid::new_v4();
        let task = task_owned_by(owner);

        assert!(can_access(owner, &task, TaskAction::Update));
        assert!(can_access(owner, &task, TaskAction::Delete));
    }

    #[test]
    fn test_other_user_is_denied() {
        let task = task_owned_by(Uuid::new_v4());
        let intruder = Uuid::new_v4();

        assert!(!can_access(intruder, &task, TaskAction::Update));
        assert_eq!(
            authorize(intruder, &task, TaskAction::Delete),
            Err(AuthzError::NotOwner {
                task_id: task.id,
                action: TaskAction::Delete,
            })
        );
    }

    #[test]
    fn test_error_message_names_action() {
        let task = task_owned_by(Uuid::new_v4());
        let err = authorize(Uuid::new_v4(), &task, TaskAction::Update).unwrap_err();
        assert!(err.to_string().starts_with("Not authorized to update task"));
    }
}
