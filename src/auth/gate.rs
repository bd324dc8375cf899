//! Role gate: bearer token extraction plus per-route role enforcement

use crate::{
    auth::{
        role::Role,
        token::{TokenPurpose, TokenService},
    },
    error::AppError,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
    pub role: Role,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// 从 Authorization 头提取 Bearer 令牌
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let (scheme, token) = value.split_once(' ').ok_or(AppError::Unauthorized)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }

    Ok(token)
}

/// Checker bound to one route's allow-list. Cloning is cheap and the gate
/// holds no per-request state.
#[derive(Clone)]
pub struct RoleGate {
    tokens: Arc<TokenService>,
    allowed: Arc<[Role]>,
}

/// Build a gate admitting only access tokens whose role is in `allowed`.
pub fn authorize(tokens: Arc<TokenService>, allowed: &[Role]) -> RoleGate {
    RoleGate {
        tokens,
        allowed: Arc::from(allowed),
    }
}

impl RoleGate {
    pub fn allowed_roles(&self) -> &[Role] {
        &self.allowed
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }

    /// Admit or deny a request from its headers alone.
    ///
    /// Missing, malformed, expired, forged and refresh-purpose tokens all
    /// yield `Unauthorized`; a valid token with a role outside the allow-list
    /// yields `Forbidden`.
    pub fn check(&self, headers: &HeaderMap) -> Result<AuthContext, AppError> {
        let token = extract_token(headers).map_err(|e| {
            tracing::debug!("Missing or malformed bearer token");
            e
        })?;

        let verified = self
            .tokens
            .verify(token, Some(TokenPurpose::Access))
            .map_err(|e| {
                tracing::debug!(reason = %e, "Access token rejected");
                AppError::Unauthorized
            })?;

        if !self.allows(verified.role) {
            tracing::warn!(
                username = %verified.identity,
                role = %verified.role,
                allowed = ?self.allowed,
                "Role not permitted for route"
            );
            return Err(AppError::Forbidden);
        }

        Ok(AuthContext {
            username: verified.identity,
            role: verified.role,
        })
    }
}

/// 角色校验中间件，通过 `from_fn_with_state(gate, enforce_roles)` 挂到路由上
pub async fn enforce_roles(
    State(gate): State<RoleGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_context = gate.check(req.headers())?;

    // 附加到请求扩展
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
