//! Credential store: user lookup and creation

use crate::{auth::Role, error::AppError, models::user::User};
use async_trait::async_trait;
use sqlx::PgPool;

/// Storage of credential records. The auth core only reads through this
/// seam; hashing happens before `create` is called.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 根据用户名查找用户
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// 创建用户，用户名重复时返回 `Conflict`
    async fn create(&self, username: &str, password_hash: &str, role: Role) -> Result<User, AppError>;
}

/// PostgreSQL-backed credential store
pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn create(&self, username: &str, password_hash: &str, role: Role) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.db)
        .await
        .map_err(|e| super::map_constraint_error(e, "Username already exists"))
    }
}
