//! In-process `Storage` used by handler tests. Mirrors the constraints the
//! PostgreSQL schema enforces (unique usernames, task -> user foreign key
//! without cascade).

use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{Storage, StorageError, Task, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    next_user_id: i64,
    next_task_id: i64,
}

#[derive(Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }

    pub fn task_count(&self) -> usize {
        self.tables.lock().unwrap().tasks.len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save_user(&self, username: &str, password_hash: &str) -> Result<i64, StorageError> {
        let mut t = self.tables.lock().unwrap();
        if t.users.values().any(|u| u.username == username) {
            return Err(StorageError::DuplicateUsername);
        }
        t.next_user_id += 1;
        let user_id = t.next_user_id;
        t.users.insert(
            user_id,
            User {
                user_id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(user_id)
    }

    async fn get_user_by_id(&self, user_id: i64) -> Result<User, StorageError> {
        let t = self.tables.lock().unwrap();
        t.users.get(&user_id).cloned().ok_or(StorageError::UserNotFound)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, StorageError> {
        let t = self.tables.lock().unwrap();
        t.users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(StorageError::UserNotFound)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StorageError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.values().any(|u| u.username == username))
    }

    async fn update_user_password(&self, user_id: i64, password_hash: &str) -> Result<(), StorageError> {
        let mut t = self.tables.lock().unwrap();
        let user = t.users.get_mut(&user_id).ok_or(StorageError::UserNotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), StorageError> {
        let mut t = self.tables.lock().unwrap();
        if !t.users.contains_key(&user_id) {
            return Err(StorageError::UserNotFound);
        }
        if t.tasks.values().any(|task| task.user_id == user_id) {
            return Err(StorageError::ForeignKeyViolation);
        }
        t.users.remove(&user_id);
        Ok(())
    }

    async fn save_task(&self, user_id: i64, content: &str) -> Result<i64, StorageError> {
        let mut t = self.tables.lock().unwrap();
        if !t.users.contains_key(&user_id) {
            return Err(StorageError::ForeignKeyViolation);
        }
        t.next_task_id += 1;
        let task_id = t.next_task_id;
        t.tasks.insert(
            task_id,
            Task {
                task_id,
                user_id,
                task_content: content.to_string(),
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(task_id)
    }

    async fn get_tasks_by_user_id(&self, user_id: i64) -> Result<Vec<Task>, StorageError> {
        let t = self.tables.lock().unwrap();
        if !t.users.contains_key(&user_id) {
            return Err(StorageError::UserNotFound);
        }
        Ok(t.tasks
            .values()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_task_by_id(&self, task_id: i64) -> Result<Task, StorageError> {
        let t = self.tables.lock().unwrap();
        t.tasks.get(&task_id).cloned().ok_or(StorageError::TaskNotFound)
    }

    async fn update_task_content(&self, task_id: i64, content: &str) -> Result<(), StorageError> {
        let mut t = self.tables.lock().unwrap();
        let task = t.tasks.get_mut(&task_id).ok_or(StorageError::TaskNotFound)?;
        task.task_content = content.to_string();
        Ok(())
    }

    async fn delete_task(&self, task_id: i64) -> Result<(), StorageError> {
        let mut t = self.tables.lock().unwrap();
        t.tasks.remove(&task_id).map(|_| ()).ok_or(StorageError::TaskNotFound)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enforces_unique_usernames() {
        let store = MemoryStorage::new();
        store.save_user("alice", "h1").await.unwrap();
        let err = store.save_user("alice", "h2").await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateUsername));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn enforces_task_owner() {
        let store = MemoryStorage::new();
        let err = store.save_task(42, "orphan").await.unwrap_err();
        assert!(matches!(err, StorageError::ForeignKeyViolation));
        assert_eq!(store.task_count(), 0);

        let uid = store.save_user("bob", "h").await.unwrap();
        store.save_task(uid, "mine").await.unwrap();
        let err = store.delete_user(uid).await.unwrap_err();
        assert!(matches!(err, StorageError::ForeignKeyViolation));
    }
}
