//! 商品管理的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::{
        auth::MessageResponse,
        catalog::*,
        pagination::{PageQuery, Pagination},
    },
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 创建商品，品牌与分类必须已存在
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let product = state.catalog_service.create_product(&req).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// 列出商品，可按名称（模糊、忽略大小写）或品牌过滤
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination::new(query.page, query.page_size);
    let page = state
        .catalog_service
        .list_products(&query.filter(), pagination)
        .await?;

    Ok(Json(page))
}

/// 按分类查询商品（需同时属于所有给定分类）
pub async fn list_products_by_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    payload: Result<Json<ProductsByCategoriesRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let page = state
        .catalog_service
        .products_by_categories(&req.categories, query.pagination())
        .await?;

    Ok(Json(page))
}

/// 获取商品详情
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.catalog_service.get_product(id).await?;

    Ok(Json(product))
}

/// 更新商品
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let product = state.catalog_service.update_product(id, &req).await?;

    Ok(Json(product))
}

/// 删除商品
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog_service.delete_product(id).await?;

    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
