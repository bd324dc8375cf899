//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::{
    auth::{enforce_roles, Role},
    handlers,
    middleware::{request_tracking_middleware, AppState},
};

/// 只允许 `allowed` 中的角色访问这组路由
fn restrict(
    router: Router<Arc<AppState>>,
    state: &AppState,
    allowed: &[Role],
) -> Router<Arc<AppState>> {
    router.route_layer(middleware::from_fn_with_state(
        state.gate(allowed),
        enforce_roles,
    ))
}

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需令牌）
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh_token));

    // 任意角色的有效访问令牌
    let me_routes = restrict(
        Router::new().route("/api/auth/me", get(handlers::auth::get_current_user)),
        &state,
        &Role::ALL,
    );

    // 按角色划分的示例路由，admin 可访问全部
    let protected_routes = Router::new()
        .merge(restrict(
            Router::new().route("/api/protected/admin", get(handlers::protected::admin_route)),
            &state,
            &[Role::Admin],
        ))
        .merge(restrict(
            Router::new().route(
                "/api/protected/logistic",
                get(handlers::protected::logistic_route),
            ),
            &state,
            &[Role::Admin, Role::Logistic],
        ))
        .merge(restrict(
            Router::new().route("/api/protected/finance", get(handlers::protected::finance_route)),
            &state,
            &[Role::Admin, Role::Finance],
        ))
        .merge(restrict(
            Router::new().route(
                "/api/protected/marketing",
                get(handlers::protected::marketing_route),
            ),
            &state,
            &[Role::Admin, Role::Marketing],
        ));

    // 商品目录（仅 admin）
    let catalog_routes = Router::new()
        // 品牌
        .route("/api/inventories/brand", post(handlers::brand::create_brand))
        .route("/api/inventories/brands", get(handlers::brand::list_brands))
        .route(
            "/api/inventories/brand/{id}",
            get(handlers::brand::get_brand)
                .put(handlers::brand::update_brand)
                .delete(handlers::brand::delete_brand),
        )
        // 分类
        .route("/api/inventories/category", post(handlers::category::create_category))
        .route("/api/inventories/categories", get(handlers::category::list_categories))
        .route(
            "/api/inventories/category/{id}",
            get(handlers::category::get_category)
                .put(handlers::category::update_category)
                .delete(handlers::category::delete_category),
        )
        // 商品
        .route("/api/inventories/product", post(handlers::product::create_product))
        .route("/api/inventories/products", get(handlers::product::list_products))
        .route(
            "/api/inventories/products/by-categories",
            post(handlers::product::list_products_by_categories),
        )
        .route(
            "/api/inventories/product/{id}",
            get(handlers::product::get_product)
                .put(handlers::product::update_product)
                .delete(handlers::product::delete_product),
        );
    let catalog_routes = restrict(catalog_routes, &state, &[Role::Admin]);

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(me_routes)
        .merge(protected_routes)
        .merge(catalog_routes)
        .layer(middleware::from_fn(request_tracking_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(state.config.server.body_limit_bytes))
        .with_state(state)
}
