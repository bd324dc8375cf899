//! 统一错误模型
//! 内部错误分类在最外层统一映射为 HTTP 状态码，细节只进日志

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// 令牌缺失、格式错误、过期或签名无效，对外不做区分
    #[error("Authentication failed")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Refresh token missing")]
    RefreshTokenMissing,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::RefreshTokenMissing => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden | AppError::InvalidRefreshToken => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::RefreshTokenMissing => "Refresh token missing".to_string(),
            AppError::Forbidden => "Forbidden".to_string(),
            AppError::InvalidRefreshToken => "Invalid refresh token".to_string(),
            AppError::NotFound(what) => format!("{} not found", what),
            AppError::BadRequest(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }
}

/// 错误响应 DTO
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: u16,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = ErrorResponse {
            message: self.user_message(),
            code: self.code(),
            request_id: uuid::Uuid::new_v4().to_string(),
        };

        // 记录错误日志，5xx 才带完整错误链
        if status.is_server_error() {
            tracing::error!(
                code = error_response.code,
                error = %self,
                request_id = %error_response.request_id,
                "Application error"
            );
        } else {
            tracing::warn!(
                code = error_response.code,
                error = %self,
                request_id = %error_response.request_id,
                "Request rejected"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 校验失败统一作为 400
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

/// 请求体无法解析时同样走统一错误格式
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::Unauthorized.code(), 401);
        assert_eq!(AppError::InvalidCredentials.code(), 401);
        assert_eq!(AppError::RefreshTokenMissing.code(), 401);
        assert_eq!(AppError::Forbidden.code(), 403);
        assert_eq!(AppError::InvalidRefreshToken.code(), 403);
        assert_eq!(AppError::not_found("Brand").code(), 404);
        assert_eq!(AppError::BadRequest("test".to_string()).code(), 400);
        assert_eq!(AppError::Conflict("dup".to_string()).code(), 409);
        assert_eq!(AppError::Internal("boom".to_string()).code(), 500);
    }

    #[test]
    fn test_user_message_no_sensitive_info() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        let message = error.user_message();
        assert_eq!(message, "Database error occurred");
        assert!(!message.contains("sqlx"));

        let error = AppError::Internal("store at 10.0.0.3 unreachable".to_string());
        assert_eq!(error.user_message(), "Internal server error");
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(AppError::not_found("Product").user_message(), "Product not found");
    }
}
