//! 商品目录服务：存在性校验与分页组装

use crate::{
    error::AppError,
    models::{
        catalog::*,
        pagination::{Page, Pagination},
    },
    repository::CatalogRepository,
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct CatalogService {
    repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(db: PgPool) -> Self {
        Self {
            repo: CatalogRepository::new(db),
        }
    }

    // ==================== Brands ====================

    pub async fn create_brand(&self, req: &CreateBrandRequest) -> Result<Brand, AppError> {
        let brand = self.repo.create_brand(req).await?;
        tracing::info!(brand_id = %brand.id, name = %brand.name, "Brand created");
        Ok(brand)
    }

    pub async fn list_brands(&self, pagination: Pagination) -> Result<Page<Brand>, AppError> {
        let (brands, total) = self.repo.list_brands(pagination).await?;
        Ok(Page::new(brands, pagination, total))
    }

    pub async fn get_brand(&self, id: Uuid) -> Result<Brand, AppError> {
        self.repo
            .get_brand(id)
            .await?
            .ok_or_else(|| AppError::not_found("Brand"))
    }

    pub async fn update_brand(&self, id: Uuid, req: &UpdateBrandRequest) -> Result<Brand, AppError> {
        self.repo
            .update_brand(id, req)
            .await?
            .ok_or_else(|| AppError::not_found("Brand"))
    }

    pub async fn delete_brand(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_brand(id).await? {
            return Err(AppError::not_found("Brand"));
        }
        tracing::info!(brand_id = %id, "Brand deleted");
        Ok(())
    }

    // ==================== Categories ====================

    pub async fn create_category(&self, req: &CreateCategoryRequest) -> Result<Category, AppError> {
        let category = self.repo.create_category(req).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn list_categories(&self, pagination: Pagination) -> Result<Page<Category>, AppError> {
        let (categories, total) = self.repo.list_categories(pagination).await?;
        Ok(Page::new(categories, pagination, total))
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, AppError> {
        self.repo
            .get_category(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category"))
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        req: &UpdateCategoryRequest,
    ) -> Result<Category, AppError> {
        self.repo
            .update_category(id, req)
            .await?
            .ok_or_else(|| AppError::not_found("Category"))
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_category(id).await? {
            return Err(AppError::not_found("Category"));
        }
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }

    // ==================== Products ====================

    pub async fn create_product(&self, req: &CreateProductRequest) -> Result<Product, AppError> {
        self.ensure_brand_exists(req.brand).await?;
        let category_ids = dedup_ids(&req.categories);
        self.ensure_categories_exist(&category_ids).await?;

        let id = self.repo.create_product(req, &category_ids).await?;
        tracing::info!(product_id = %id, name = %req.name, "Product created");

        self.get_product(id).await
    }

    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> Result<Page<Product>, AppError> {
        let (products, total) = self.repo.list_products(filter, pagination).await?;
        Ok(Page::new(products, pagination, total))
    }

    /// Products carrying every one of the given categories
    pub async fn products_by_categories(
        &self,
        category_ids: &[Uuid],
        pagination: Pagination,
    ) -> Result<Page<Product>, AppError> {
        let filter = ProductFilter::HasAllCategories(dedup_ids(category_ids));
        self.list_products(&filter, pagination).await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.repo
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::not_found("Product"))
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        req: &UpdateProductRequest,
    ) -> Result<Product, AppError> {
        if let Some(brand) = req.brand {
            self.ensure_brand_exists(brand).await?;
        }

        let category_ids = req.categories.as_deref().map(dedup_ids);
        if let Some(ids) = &category_ids {
            self.ensure_categories_exist(ids).await?;
        }

        if !self
            .repo
            .update_product(id, req, category_ids.as_deref())
            .await?
        {
            return Err(AppError::not_found("Product"));
        }

        self.get_product(id).await
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_product(id).await? {
            return Err(AppError::not_found("Product"));
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    async fn ensure_brand_exists(&self, id: Uuid) -> Result<(), AppError> {
        if self.repo.get_brand(id).await?.is_none() {
            return Err(AppError::not_found("Brand"));
        }
        Ok(())
    }

    async fn ensure_categories_exist(&self, ids: &[Uuid]) -> Result<(), AppError> {
        let found = self.repo.count_existing_categories(ids).await?;
        if found != ids.len() as i64 {
            return Err(AppError::not_found("One or more categories"));
        }
        Ok(())
    }
}

/// 去重并保持原有顺序
fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
