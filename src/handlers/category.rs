//! 分类管理的 HTTP 处理器

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

/// 创建分类
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let category = state.catalog_service.create_category(&req).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// 分页列出分类
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.catalog_service.list_categories(query.pagination()).await?;

    Ok(Json(page))
}

/// 获取分类详情
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let category = state.catalog_service.get_category(id).await?;

    Ok(Json(category))
}

/// 更新分类
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let category = state.catalog_service.update_category(id, &req).await?;

    Ok(Json(category))
}

/// 删除分类
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog_service.delete_category(id).await?;

    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
