//! 认证相关的 HTTP 处理器

use crate::{
    auth::AuthContext,
    error::AppError,
    middleware::AppState,
    models::auth::*,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    state.auth_service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let token_pair = state.auth_service.login(req).await?;

    Ok(Json(token_pair))
}

/// 刷新令牌
///
/// 缺少请求体、请求体不是 JSON 或字段为空，都视为未携带刷新令牌
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Refresh body rejected");
            RefreshTokenRequest::default()
        }
    };

    let refresh_token = req
        .refresh_token
        .filter(|t| !t.trim().is_empty())
        .ok_or(AppError::RefreshTokenMissing)?;

    let token_pair = state.auth_service.refresh(refresh_token.trim()).await?;

    Ok(Json(token_pair))
}

/// 获取当前令牌对应的身份
pub async fn get_current_user(auth_context: AuthContext) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        username: auth_context.username,
        role: auth_context.role,
    })
}
