use crate::error::AppError;
use crate::models::{Task, User};

/// Kind of access being requested on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

/// Whether `user` may touch `task`.
///
/// Decided from the task record itself (`owner` and `shared_to`), never from the
/// user's `own_task_ids`/`shared_task_ids`, which are only an index and may lag.
/// Read and write currently follow the same rule.
pub fn can_access(user: &User, task: &Task, mode: AccessMode) -> bool {
    match mode {
        AccessMode::Read | AccessMode::Write => {
            task.owner == user.id || task.shared_to.contains(&user.id)
        }
    }
}

/// Like [`can_access`], but yields `AppError::Forbidden` on denial.
pub fn ensure_access(user: &User, task: &Task, mode: AccessMode) -> Result<(), AppError> {
    if can_access(user, task, mode) {
        Ok(())
    } else {
        log::info!(
            "User {} denied {:?} access to task {}",
            user.username,
            mode,
            task.id
        );
        Err(AppError::Forbidden(format!(
            "Not authorized to access task {}",
            task.id
        )))
    }
}

/// Only the owner may grant access to others.
pub fn ensure_owner(user: &User, task: &Task) -> Result<(), AppError> {
    if task.owner == user.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Only the owner can share task {}",
            task.id
        )))
    }
}
