//! 健康检查处理器
//! 提供 /health 和 /ready 端点

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::{db, middleware::AppState};

/// 存活探针响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// 就绪探针响应
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<HealthCheck>,
}

/// 健康检查项
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static APP_START_TIME: OnceLock<Instant> = OnceLock::new();

/// 设置应用启动时间（main.rs 启动时调用）
pub fn set_start_time() {
    APP_START_TIME.get_or_init(Instant::now);
}

/// 获取应用运行时间（秒）
pub fn get_uptime() -> u64 {
    APP_START_TIME.get().map_or(0, |start| start.elapsed().as_secs())
}

/// 存活探针，不检查依赖
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: get_uptime(),
    })
}

/// 就绪探针，检查数据库
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let db_health = db::health_check(&state.db).await;
    db::record_pool_metrics(&state.db);

    let checks = vec![HealthCheck {
        name: "database".to_string(),
        status: if db_health.is_healthy() { "healthy" } else { "unhealthy" }.to_string(),
        message: match db_health {
            db::HealthStatus::Healthy => None,
            db::HealthStatus::Unhealthy(msg) => Some(msg),
        },
    }];

    let ready = checks.iter().all(|c| c.status == "healthy");
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}
