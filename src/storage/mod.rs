use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
pub mod memory;
pub mod models;
pub mod postgres;

pub use models::{Task, User};
pub use postgres::PgStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("user not found")]
    UserNotFound,

    #[error("task not found")]
    TaskNotFound,

    #[error("username already exists")]
    DuplicateUsername,

    /// A write referenced a missing row, or a delete would orphan dependents.
    #[error("foreign key constraint violated")]
    ForeignKeyViolation,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for users and their tasks.
///
/// Passwords arrive here already hashed.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_user(&self, username: &str, password_hash: &str) -> Result<i64, StorageError>;
    async fn get_user_by_id(&self, user_id: i64) -> Result<User, StorageError>;
    async fn get_user_by_username(&self, username: &str) -> Result<User, StorageError>;
    async fn username_exists(&self, username: &str) -> Result<bool, StorageError>;
    async fn update_user_password(&self, user_id: i64, password_hash: &str) -> Result<(), StorageError>;
    async fn delete_user(&self, user_id: i64) -> Result<(), StorageError>;

    async fn save_task(&self, user_id: i64, content: &str) -> Result<i64, StorageError>;
    async fn get_tasks_by_user_id(&self, user_id: i64) -> Result<Vec<Task>, StorageError>;
    async fn get_task_by_id(&self, task_id: i64) -> Result<Task, StorageError>;
    async fn update_task_content(&self, task_id: i64, content: &str) -> Result<(), StorageError>;
    async fn delete_task(&self, task_id: i64) -> Result<(), StorageError>;

    async fn ping(&self) -> Result<(), StorageError>;
}
