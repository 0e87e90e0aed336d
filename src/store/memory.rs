use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskUpdate, User};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    tasks: HashMap<Uuid, Task>,
    // insertion order, so listings are stable
    task_order: Vec<Uuid>,
}

/// In-process store used when no database is configured, and by the tests.
///
/// Every operation takes the lock exactly once, which makes uniqueness checks
/// and set updates atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn add_to_set(set: &mut Vec<Uuid>, id: Uuid) {
    if !set.contains(&id) {
        set.push(id);
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(AppError::DuplicateUsername);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            hashed_password: user.hashed_password,
            own_task_ids: Vec::new(),
            shared_task_ids: Vec::new(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn add_own_task(&self, user_id: Uuid, task_id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} does not exist", user_id)))?;
        add_to_set(&mut user.own_task_ids, task_id);
        Ok(())
    }

    async fn add_shared_task(&self, user_id: Uuid, task_id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} does not exist", user_id)))?;
        add_to_set(&mut user.shared_task_ids, task_id);
        Ok(())
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self.inner.read().await.tasks.get(&id).cloned())
    }

    async fn list_tasks_by_owner(
        &self,
        owner: Uuid,
        limit: usize,
    ) -> Result<Vec<Task>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .task_order
            .iter()
            .filter_map(|id| inner.tasks.get(id))
            .filter(|task| task.owner == owner)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task, AppError> {
        let task = Task {
            id: Uuid::new_v4(),
            name: task.name,
            due_date: task.due_date,
            owner: task.owner,
            shared_to: Vec::new(),
        };

        let mut inner = self.inner.write().await;
        inner.task_order.push(task.id);
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Option<Task>, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.tasks.get_mut(&id).map(|task| {
            update.apply_to(task);
            task.clone()
        }))
    }

    async fn share_task(&self, id: Uuid, user_id: Uuid) -> Result<Option<Task>, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.tasks.get_mut(&id).map(|task| {
            add_to_set(&mut task.shared_to, user_id);
            task.clone()
        }))
    }

    async fn delete_task(&self, id: Uuid) -> Result<u64, AppError> {
        let mut inner = self.inner.write().await;
        if inner.tasks.remove(&id).is_none() {
            return Ok(0);
        }

        inner.task_order.retain(|task_id| *task_id != id);
        for user in inner.users.values_mut() {
            user.own_task_ids.retain(|task_id| *task_id != id);
            user.shared_task_ids.retain(|task_id| *task_id != id);
        }
        Ok(1)
    }
}
