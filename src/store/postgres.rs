use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::Store;
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskUpdate, User};

const USER_COLUMNS: &str = "id, username, hashed_password, own_task_ids, shared_task_ids";
const TASK_COLUMNS: &str = "id, name, due_date, owner, shared_to";

/// PostgreSQL-backed store.
///
/// Username uniqueness comes from the `users_username_key` index and every
/// list mutation is a single `UPDATE` using `array_append`/`array_remove`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and brings the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self::new(pool))
    }

    async fn append_user_list(
        &self,
        column: &str,
        user_id: Uuid,
        task_id: Uuid,
    ) -> Result<(), AppError> {
        let sql = format!(
            "UPDATE users SET {col} = CASE WHEN $2 = ANY({col}) THEN {col} ELSE array_append({col}, $2) END \
             WHERE id = $1",
            col = column
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} does not exist", user_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        // A users_username_key violation is mapped to DuplicateUsername by From<sqlx::Error>.
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, hashed_password) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.username)
        .bind(user.hashed_password)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn add_own_task(&self, user_id: Uuid, task_id: Uuid) -> Result<(), AppError> {
        self.append_user_list("own_task_ids", user_id, task_id).await
    }

    async fn add_shared_task(&self, user_id: Uuid, task_id: Uuid) -> Result<(), AppError> {
        self.append_user_list("shared_task_ids", user_id, task_id)
            .await
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn list_tasks_by_owner(
        &self,
        owner: Uuid,
        limit: usize,
    ) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE owner = $1 ORDER BY created_at LIMIT $2",
            TASK_COLUMNS
        ))
        .bind(owner)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (name, due_date, owner) VALUES ($1, $2, $3) RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.name)
        .bind(task.due_date)
        .bind(task.owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET name = COALESCE($2, name), due_date = COALESCE($3, due_date) \
             WHERE id = $1 RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.due_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn share_task(&self, id: Uuid, user_id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET shared_to = CASE WHEN $2 = ANY(shared_to) THEN shared_to \
             ELSE array_append(shared_to, $2) END \
             WHERE id = $1 RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete_task(&self, id: Uuid) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted > 0 {
            sqlx::query(
                "UPDATE users SET own_task_ids = array_remove(own_task_ids, $1), \
                 shared_task_ids = array_remove(shared_task_ids, $1) \
                 WHERE $1 = ANY(own_task_ids) OR $1 = ANY(shared_task_ids)",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }
}
