//! 认证服务：注册、登录、令牌刷新

use crate::{
    auth::{PasswordHasher, TokenPair, TokenPurpose, TokenService},
    config::AppConfig,
    error::AppError,
    models::{auth::*, user::*},
    repository::CredentialStore,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
    // 未知用户登录时也执行一次完整校验，使响应耗时与密码错误一致
    dummy_hash: String,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        config: Arc<AppConfig>,
    ) -> Result<Self, AppError> {
        let hasher = PasswordHasher::from_config(&config.security)?;
        let dummy_hash = hasher.hash(&uuid::Uuid::new_v4().to_string())?;

        Ok(Self {
            store,
            tokens,
            hasher,
            dummy_hash,
            config,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// 注册用户
    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, AppError> {
        if !self.config.security.allow_registration {
            return Err(AppError::Forbidden);
        }

        let username = req.username.trim();
        if username.is_empty() || username.len() > 64 {
            return Err(AppError::BadRequest(
                "Username must be between 1 and 64 characters".to_string(),
            ));
        }

        PasswordHasher::validate_password_policy(&req.password, &self.config.security)?;

        let password_hash = self.hash_password(req.password).await?;
        let user = self.store.create(username, &password_hash, req.role).await?;

        tracing::info!(username = %user.username, role = %user.role, "User registered");

        Ok(UserResponse::from(user))
    }

    /// 用户登录，成功后签发访问令牌与刷新令牌
    pub async fn login(&self, req: LoginRequest) -> Result<TokenPair, AppError> {
        let username = req.username.trim();
        let user = match timeout(self.lookup_timeout(), self.store.find_by_username(username)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::error!(username = %username, "Credential lookup timed out during login");
                return Err(AppError::Internal("credential lookup timed out".to_string()));
            }
        };

        let Some(user) = user else {
            // 结果丢弃，只为耗时
            let _ = self.verify_password(req.password, self.dummy_hash.clone()).await;
            tracing::info!(username = %username, "Login failed: unknown user");
            return Err(AppError::InvalidCredentials);
        };

        if let Err(e) = self.verify_password(req.password, user.password_hash.clone()).await {
            tracing::info!(username = %user.username, "Login failed: wrong password");
            return Err(e);
        }

        let pair = self.tokens.issue_pair(&user.username, user.role)?;

        tracing::info!(username = %user.username, role = %user.role, "Login succeeded");

        Ok(pair)
    }

    /// 刷新令牌
    ///
    /// The role is re-read from the credential store, so a role change takes
    /// effect on the next refresh. Both members of the pair are reissued.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let verified = self
            .tokens
            .verify(refresh_token, Some(TokenPurpose::Refresh))
            .map_err(|e| {
                tracing::debug!(reason = %e, "Refresh token rejected");
                AppError::InvalidRefreshToken
            })?;

        let user = match timeout(self.lookup_timeout(), self.store.find_by_username(&verified.identity)).await {
            Ok(Ok(Some(user))) => user,
            Ok(Ok(None)) => {
                tracing::warn!(username = %verified.identity, "Refresh for identity that no longer exists");
                return Err(AppError::InvalidRefreshToken);
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                tracing::warn!(username = %verified.identity, "Credential lookup timed out during refresh");
                return Err(AppError::InvalidRefreshToken);
            }
        };

        if user.role != verified.role {
            tracing::info!(
                username = %user.username,
                previous_role = %verified.role,
                role = %user.role,
                "Role changed since refresh token was issued"
            );
        }

        let pair = self.tokens.issue_pair(&user.username, user.role)?;

        tracing::debug!(username = %user.username, "Token pair rotated");

        Ok(pair)
    }

    fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.config.security.credential_lookup_timeout_secs)
    }

    // Argon2 是 CPU 密集型操作，放到阻塞线程池执行
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<(), AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("password verification task failed: {}", e)))?
    }
}
