//! Persistence boundary.
//!
//! `Store` is the contract every backend has to honour. Two properties are
//! required of implementations because the handlers rely on them instead of
//! doing read-modify-write themselves:
//!
//! * `insert_user` rejects a duplicate username atomically.
//! * `add_own_task`, `add_shared_task` and `share_task` are add-to-set
//!   operations that cannot lose a concurrent update.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskUpdate, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Short name of the backend, reported by the health check.
    fn backend(&self) -> &'static str;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Persists a new user with empty task lists. Fails with
    /// `AppError::DuplicateUsername` if the username is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn add_own_task(&self, user_id: Uuid, task_id: Uuid) -> Result<(), AppError>;

    async fn add_shared_task(&self, user_id: Uuid, task_id: Uuid) -> Result<(), AppError>;

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Tasks whose `owner` field is `owner`, at most `limit` of them.
    async fn list_tasks_by_owner(&self, owner: Uuid, limit: usize)
        -> Result<Vec<Task>, AppError>;

    async fn insert_task(&self, task: NewTask) -> Result<Task, AppError>;

    /// Sets the present fields of `update`. `None` if no task has this id.
    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Option<Task>, AppError>;

    /// Adds `user_id` to the task's `shared_to` set. `None` if no task has this id.
    async fn share_task(&self, id: Uuid, user_id: Uuid) -> Result<Option<Task>, AppError>;

    /// Deletes the task and drops its id from every user's task lists.
    /// Returns the number of tasks removed (0 or 1).
    async fn delete_task(&self, id: Uuid) -> Result<u64, AppError>;
}
