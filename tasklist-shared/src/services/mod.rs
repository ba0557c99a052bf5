/// Business operations
///
/// Services validate input, apply the ownership policy and call the store.
/// They never see HTTP types: every operation takes the caller's identity as
/// an explicit argument and returns a typed error that the API layer maps to
/// a status code in one place.
///
/// - [`accounts`]: registration and login
/// - [`tasks`]: task list, create, status update, delete and filter

pub mod accounts;
pub mod tasks;

pub use accounts::{AccountError, LoginInput, LoginOutcome, RegisterInput};
pub use tasks::{CreateTaskInput, TaskError, TaskService, UpdateStatusInput};
