//! 认证服务测试：刷新时重新读取角色、并发刷新、身份删除

use async_trait::async_trait;
use catalog_service::{
    auth::{Role, TokenPurpose, TokenService},
    error::AppError,
    models::{
        auth::{LoginRequest, RegisterRequest},
        user::User,
    },
    repository::CredentialStore,
    services::AuthService,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

mod common;
use common::{create_test_app, create_test_app_with, create_test_config};

/// 模拟一个永远不返回的凭据存储
struct StalledStore;

#[async_trait]
impl CredentialStore for StalledStore {
    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, AppError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(None)
    }

    async fn create(&self, _username: &str, _password_hash: &str, _role: Role) -> Result<User, AppError> {
        Err(AppError::Internal("read-only store".to_string()))
    }
}

fn stalled_service() -> AuthService {
    let mut config = create_test_config();
    config.security.credential_lookup_timeout_secs = 1;
    let tokens = Arc::new(TokenService::from_config(&config).unwrap());

    AuthService::new(Arc::new(StalledStore), tokens, Arc::new(config)).unwrap()
}

fn register_request(username: &str, role: Role) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        password: "pass123".to_string(),
        role,
    }
}

fn login_request(username: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: "pass123".to_string(),
    }
}

#[tokio::test]
async fn test_register_trims_username() {
    let app = create_test_app();
    let service = &app.state.auth_service;

    let user = service
        .register(register_request("  egipegi  ", Role::Admin))
        .await
        .unwrap();
    assert_eq!(user.username, "egipegi");

    service.login(login_request("egipegi")).await.unwrap();
    service.login(login_request(" egipegi ")).await.unwrap();
}

#[tokio::test]
async fn test_refresh_picks_up_role_change() {
    let app = create_test_app();
    let service = &app.state.auth_service;

    service.register(register_request("logan", Role::Logistic)).await.unwrap();
    let pair = service.login(login_request("logan")).await.unwrap();

    assert!(app.store.set_role("logan", Role::Finance).await);

    let refreshed = service.refresh(&pair.refresh_token).await.unwrap();
    let verified = app
        .state
        .tokens
        .verify(&refreshed.token, Some(TokenPurpose::Access))
        .unwrap();
    assert_eq!(verified.role, Role::Finance);

    // 旧访问令牌仍然携带签发时的角色，直到过期
    let old = app
        .state
        .tokens
        .verify(&pair.token, Some(TokenPurpose::Access))
        .unwrap();
    assert_eq!(old.role, Role::Logistic);
}

#[tokio::test]
async fn test_refresh_for_deleted_identity_fails() {
    let app = create_test_app();
    let service = &app.state.auth_service;

    service.register(register_request("gone", Role::Marketing)).await.unwrap();
    let pair = service.login(login_request("gone")).await.unwrap();

    assert!(app.store.remove("gone").await);

    assert!(matches!(
        service.refresh(&pair.refresh_token).await,
        Err(AppError::InvalidRefreshToken)
    ));
}

#[tokio::test]
async fn test_refresh_token_stays_reusable() {
    let app = create_test_app();
    let service = &app.state.auth_service;

    service.register(register_request("fina", Role::Finance)).await.unwrap();
    let pair = service.login(login_request("fina")).await.unwrap();

    // 没有轮换作废：同一刷新令牌在有效期内可重复使用
    service.refresh(&pair.refresh_token).await.unwrap();
    service.refresh(&pair.refresh_token).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_refreshes_all_succeed() {
    let app = create_test_app();
    let service = app.state.auth_service.clone();

    service.register(register_request("egipegi", Role::Admin)).await.unwrap();
    let pair = service.login(login_request("egipegi")).await.unwrap();

    let (a, b, c) = tokio::join!(
        service.refresh(&pair.refresh_token),
        service.refresh(&pair.refresh_token),
        service.refresh(&pair.refresh_token),
    );

    for result in [a, b, c] {
        let refreshed = result.unwrap();
        let verified = service
            .tokens()
            .verify(&refreshed.token, Some(TokenPurpose::Access))
            .unwrap();
        assert_eq!(verified.identity, "egipegi");
        assert_eq!(verified.role, Role::Admin);
    }
}

#[tokio::test]
async fn test_concurrent_verification_across_tasks() {
    let app = create_test_app();
    let tokens = app.state.tokens.clone();

    let handles: Vec<_> = Role::ALL
        .into_iter()
        .map(|role| {
            let tokens = tokens.clone();
            tokio::spawn(async move {
                let token = tokens.issue_access_token("worker", role).unwrap();
                tokens.verify(&token, Some(TokenPurpose::Access)).unwrap().role
            })
        })
        .collect();

    for (handle, role) in futures::future::join_all(handles).await.into_iter().zip(Role::ALL) {
        assert_eq!(handle.unwrap(), role);
    }
}

#[tokio::test]
async fn test_login_with_wrong_password_is_invalid_credentials() {
    let app = create_test_app();
    let service = &app.state.auth_service;

    service.register(register_request("egipegi", Role::Admin)).await.unwrap();

    let result = service
        .login(LoginRequest {
            username: "egipegi".to_string(),
            password: "nope-nope".to_string(),
        })
        .await;
    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_refresh_lookup_timeout_is_invalid_refresh_token() {
    let service = stalled_service();
    let refresh = service
        .tokens()
        .issue_refresh_token("egipegi", Role::Admin)
        .unwrap();

    assert!(matches!(
        service.refresh(&refresh).await,
        Err(AppError::InvalidRefreshToken)
    ));
}

#[tokio::test]
async fn test_login_lookup_timeout_is_internal() {
    let service = stalled_service();

    assert!(matches!(
        service.login(login_request("egipegi")).await,
        Err(AppError::Internal(_))
    ));
}

/// 返回 (已知用户密码错误, 未知用户) 两种登录失败的耗时
async fn failed_login_timings(memory_kib: u32, iterations: u32, parallelism: u32) -> (Duration, Duration) {
    let mut config = create_test_config();
    config.security.argon2_memory_kib = memory_kib;
    config.security.argon2_iterations = iterations;
    config.security.argon2_parallelism = parallelism;
    let app = create_test_app_with(config);
    let service = &app.state.auth_service;

    service.register(register_request("egipegi", Role::Admin)).await.unwrap();

    let wrong_password = LoginRequest {
        username: "egipegi".to_string(),
        password: "nope-nope".to_string(),
    };
    let started = Instant::now();
    assert!(matches!(service.login(wrong_password).await, Err(AppError::InvalidCredentials)));
    let known = started.elapsed();

    let started = Instant::now();
    assert!(matches!(
        service.login(login_request("nobody")).await,
        Err(AppError::InvalidCredentials)
    ));
    let unknown = started.elapsed();

    (known, unknown)
}

#[tokio::test]
async fn test_unknown_user_login_still_runs_password_check() {
    let (known, unknown) = failed_login_timings(8192, 2, 1).await;

    assert!(
        unknown * 4 >= known,
        "unknown user took {unknown:?}, wrong password took {known:?}"
    );
}

#[tokio::test]
#[ignore = "uses production Argon2 params, slow in debug builds"]
async fn test_unknown_user_login_timing_with_production_params() {
    let (known, unknown) = failed_login_timings(65536, 3, 4).await;

    assert!(
        unknown * 2 >= known,
        "unknown user took {unknown:?}, wrong password took {known:?}"
    );
}
