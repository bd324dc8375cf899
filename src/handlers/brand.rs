//! 品牌管理的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::{auth::MessageResponse, catalog::*, pagination::PageQuery},
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

/// 创建品牌
pub async fn create_brand(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateBrandRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let brand = state.catalog_service.create_brand(&req).await?;

    Ok((StatusCode::CREATED, Json(brand)))
}

/// 分页列出品牌
pub async fn list_brands(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.catalog_service.list_brands(query.pagination()).await?;

    Ok(Json(page))
}

/// 获取品牌详情
pub async fn get_brand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let brand = state.catalog_service.get_brand(id).await?;

    Ok(Json(brand))
}

/// 更新品牌
pub async fn update_brand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateBrandRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let brand = state.catalog_service.update_brand(id, &req).await?;

    Ok(Json(brand))
}

/// 删除品牌
pub async fn delete_brand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog_service.delete_brand(id).await?;

    Ok(Json(MessageResponse::new("Brand deleted successfully")))
}
