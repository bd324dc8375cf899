//! In-process credential store, used by tests and local runs without Postgres

use crate::{auth::Role, error::AppError, models::user::User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::user_repo::CredentialStore;

#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change a stored role. Returns false for unknown users.
    pub async fn set_role(&self, username: &str, role: Role) -> bool {
        let mut users = self.users.write().await;
        match users.get_mut(username) {
            Some(user) => {
                user.role = role;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, username: &str) -> bool {
        self.users.write().await.remove(username).is_some()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str, role: Role) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        users.insert(username.to_string(), user.clone());

        Ok(user)
    }
}
