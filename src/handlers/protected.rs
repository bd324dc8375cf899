//! 按角色保护的示例端点，角色限制在 routes.rs 中声明

use crate::auth::AuthContext;

pub async fn admin_route(auth_context: AuthContext) -> &'static str {
    tracing::debug!(username = %auth_context.username, "Admin route accessed");
    "Admin route"
}

pub async fn logistic_route(auth_context: AuthContext) -> &'static str {
    tracing::debug!(username = %auth_context.username, "Logistic route accessed");
    "Logistic route"
}

pub async fn finance_route(auth_context: AuthContext) -> &'static str {
    tracing::debug!(username = %auth_context.username, "Finance route accessed");
    "Finance route"
}

pub async fn marketing_route(auth_context: AuthContext) -> &'static str {
    tracing::debug!(username = %auth_context.username, "Marketing route accessed");
    "Marketing route"
}
