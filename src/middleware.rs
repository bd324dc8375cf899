//! HTTP 中间件与应用状态
//! 请求追踪（trace_id / request_id、指标）

use crate::{
    auth::{authorize, Role, RoleGate, TokenService},
    config::AppConfig,
    error::AppError,
    repository::CredentialStore,
    services::{AuthService, CatalogService},
};
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// 应用状态
///
/// 所有服务都用 Arc 包装，Clone 只是指针拷贝；
/// 签名密钥在构造 TokenService 时注入，之后只读。
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: PgPool,
    pub tokens: Arc<TokenService>,
    pub auth_service: Arc<AuthService>,
    pub catalog_service: Arc<CatalogService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: PgPool,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, AppError> {
        let config = Arc::new(config);
        let tokens = Arc::new(TokenService::from_config(&config)?);
        let auth_service = Arc::new(AuthService::new(credentials, tokens.clone(), config.clone())?);
        let catalog_service = Arc::new(CatalogService::new(db.clone()));

        Ok(Self {
            config,
            db,
            tokens,
            auth_service,
            catalog_service,
        })
    }

    /// 为路由构建角色门禁
    pub fn gate(&self, allowed: &[Role]) -> RoleGate {
        authorize(self.tokens.clone(), allowed)
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let uri = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // 指标标签只用静态字符串，避免基数爆炸
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        let status_code = match status {
            200 => "200",
            201 => "201",
            204 => "204",
            400 => "400",
            401 => "401",
            403 => "403",
            404 => "404",
            409 => "409",
            422 => "422",
            500 => "500",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 在响应头中回写 trace_id / request_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
