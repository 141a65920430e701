use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::debug;

use super::{Storage, StorageError, Task, User};
use crate::config::DatabaseConfig;

/// Maps constraint violations to domain errors; everything else stays a
/// database error.
fn classify(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StorageError::DuplicateUsername;
        }
        if db_err.is_foreign_key_violation() {
            return StorageError::ForeignKeyViolation;
        }
    }
    StorageError::Database(err)
}

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .connect_with(cfg.connect_options()?)
            .await?;
        Ok(pool)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn save_user(&self, username: &str, password_hash: &str) -> Result<i64, StorageError> {
        let user_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING user_id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;
        debug!(user_id, "user inserted");
        Ok(user_id)
    }

    async fn get_user_by_id(&self, user_id: i64) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, password, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::UserNotFound)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, password, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::UserNotFound)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StorageError> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)"#)
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn update_user_password(&self, user_id: i64, password_hash: &str) -> Result<(), StorageError> {
        let result = sqlx::query(r#"UPDATE users SET password = $1 WHERE user_id = $2"#)
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::UserNotFound);
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), StorageError> {
        let result = sqlx::query(r#"DELETE FROM users WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::UserNotFound);
        }
        Ok(())
    }

    async fn save_task(&self, user_id: i64, content: &str) -> Result<i64, StorageError> {
        let task_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tasks (user_id, task_content)
            VALUES ($1, $2)
            RETURNING task_id
            "#,
        )
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;
        debug!(user_id, task_id, "task inserted");
        Ok(task_id)
    }

    async fn get_tasks_by_user_id(&self, user_id: i64) -> Result<Vec<Task>, StorageError> {
        // Distinguishes "unknown user" from "user without tasks".
        self.get_user_by_id(user_id).await?;

        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT task_id, user_id, task_content, created_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY task_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_task_by_id(&self, task_id: i64) -> Result<Task, StorageError> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT task_id, user_id, task_content, created_at
            FROM tasks
            WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::TaskNotFound)
    }

    async fn update_task_content(&self, task_id: i64, content: &str) -> Result<(), StorageError> {
        let result = sqlx::query(r#"UPDATE tasks SET task_content = $1 WHERE task_id = $2"#)
            .bind(content)
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::TaskNotFound);
        }
        Ok(())
    }

    async fn delete_task(&self, task_id: i64) -> Result<(), StorageError> {
        let result = sqlx::query(r#"DELETE FROM tasks WHERE task_id = $1"#)
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::TaskNotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
