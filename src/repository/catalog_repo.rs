//! Catalog repository (品牌、分类、商品数据访问)

use crate::{
    error::AppError,
    models::{
        catalog::*,
        pagination::Pagination,
    },
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

use super::{escape_like, map_constraint_error};

const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id, p.name, p.brand_id, b.name AS brand_name, p.description,
        p.purchase_price, p.selling_price, p.created_at, p.updated_at
    FROM products p
    JOIN brands b ON b.id = p.brand_id
"#;

pub struct CatalogRepository {
    db: PgPool,
}

impl CatalogRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ==================== Brands ====================

    /// 创建品牌
    pub async fn create_brand(&self, req: &CreateBrandRequest) -> Result<Brand, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            r#"
            INSERT INTO brands (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .fetch_one(&self.db)
        .await?;

        Ok(brand)
    }

    /// 获取品牌
    pub async fn get_brand(&self, id: Uuid) -> Result<Option<Brand>, AppError> {
        let brand = sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(brand)
    }

    /// 分页列出品牌
    pub async fn list_brands(&self, pagination: Pagination) -> Result<(Vec<Brand>, i64), AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM brands")
            .fetch_one(&self.db)
            .await?;

        let brands = sqlx::query_as::<_, Brand>(
            "SELECT * FROM brands ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok((brands, total))
    }

    /// 更新品牌
    pub async fn update_brand(
        &self,
        id: Uuid,
        req: &UpdateBrandRequest,
    ) -> Result<Option<Brand>, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            r#"
            UPDATE brands
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .fetch_optional(&self.db)
        .await?;

        Ok(brand)
    }

    /// 删除品牌，仍被商品引用时返回冲突
    pub async fn delete_brand(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| map_constraint_error(e, "Brand is still referenced by products"))?;

        Ok(result.rows_affected() > 0)
    }

    // ==================== Categories ====================

    /// 创建分类
    pub async fn create_category(&self, req: &CreateCategoryRequest) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    /// 获取分类
    pub async fn get_category(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(category)
    }

    /// 分页列出分类
    pub async fn list_categories(
        &self,
        pagination: Pagination,
    ) -> Result<(Vec<Category>, i64), AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.db)
            .await?;

        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok((categories, total))
    }

    /// 更新分类
    pub async fn update_category(
        &self,
        id: Uuid,
        req: &UpdateCategoryRequest,
    ) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .fetch_optional(&self.db)
        .await?;

        Ok(category)
    }

    /// 删除分类，仍被商品引用时返回冲突
    pub async fn delete_category(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| map_constraint_error(e, "Category is still referenced by products"))?;

        Ok(result.rows_affected() > 0)
    }

    /// 统计给定 ID 中实际存在的分类数量
    pub async fn count_existing_categories(&self, ids: &[Uuid]) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }

    // ==================== Products ====================

    /// 创建商品及其分类关联
    pub async fn create_product(
        &self,
        req: &CreateProductRequest,
        category_ids: &[Uuid],
    ) -> Result<Uuid, AppError> {
        let mut tx = self.db.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, brand_id, description, purchase_price, selling_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&req.name)
        .bind(req.brand)
        .bind(&req.description)
        .bind(req.purchase_price)
        .bind(req.selling_price)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, "Brand no longer exists"))?;

        link_categories(&mut tx, id, category_ids).await?;

        tx.commit().await?;

        Ok(id)
    }

    /// 获取商品（含品牌与分类）
    pub async fn get_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        match row {
            Some(row) => Ok(self.populate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// 按过滤条件分页列出商品
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Product>, i64), AppError> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM products p");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query.build_query_scalar().fetch_one(&self.db).await?;

        let mut list_query: QueryBuilder<Postgres> = QueryBuilder::new(PRODUCT_SELECT);
        push_filter(&mut list_query, filter);
        list_query
            .push(" ORDER BY p.created_at DESC, p.id LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let rows: Vec<ProductRow> = list_query.build_query_as().fetch_all(&self.db).await?;

        Ok((self.populate(rows).await?, total))
    }

    /// 更新商品；提供 categories 时整体替换关联
    pub async fn update_product(
        &self,
        id: Uuid,
        req: &UpdateProductRequest,
        category_ids: Option<&[Uuid]>,
    ) -> Result<bool, AppError> {
        let mut tx = self.db.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE products
            SET
                name = COALESCE($2, name),
                brand_id = COALESCE($3, brand_id),
                description = COALESCE($4, description),
                purchase_price = COALESCE($5, purchase_price),
                selling_price = COALESCE($6, selling_price),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(req.brand)
        .bind(&req.description)
        .bind(req.purchase_price)
        .bind(req.selling_price)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, "Brand no longer exists"))?
        .rows_affected()
            > 0;

        if !updated {
            return Ok(false);
        }

        if let Some(category_ids) = category_ids {
            sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_categories(&mut tx, id, category_ids).await?;
        }

        tx.commit().await?;

        Ok(true)
    }

    /// 删除商品
    pub async fn delete_product(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 批量加载分类并组装商品
    async fn populate(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let links = sqlx::query_as::<_, ProductCategoryRow>(
            r#"
            SELECT pc.product_id, c.id, c.name
            FROM product_categories pc
            JOIN categories c ON c.id = pc.category_id
            WHERE pc.product_id = ANY($1)
            ORDER BY c.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut by_product: HashMap<Uuid, Vec<NamedRef>> = HashMap::new();
        for link in links {
            by_product.entry(link.product_id).or_default().push(NamedRef {
                id: link.id,
                name: link.name,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let categories = by_product.remove(&row.id).unwrap_or_default();
                Product::from_row(row, categories)
            })
            .collect())
    }
}

async fn link_categories(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    product_id: Uuid,
    category_ids: &[Uuid],
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO product_categories (product_id, category_id)
        SELECT $1, UNNEST($2::uuid[])
        "#,
    )
    .bind(product_id)
    .bind(category_ids)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_constraint_error(e, "Category no longer exists"))?;

    Ok(())
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    match filter {
        ProductFilter::All => {}
        ProductFilter::NameContains(name) => {
            query
                .push(" WHERE p.name ILIKE ")
                .push_bind(format!("%{}%", escape_like(name)));
        }
        ProductFilter::Brand(brand_id) => {
            query.push(" WHERE p.brand_id = ").push_bind(*brand_id);
        }
        ProductFilter::HasAllCategories(category_ids) => {
            query
                .push(
                    " WHERE p.id IN (SELECT product_id FROM product_categories WHERE category_id = ANY(",
                )
                .push_bind(category_ids.clone())
                .push(") GROUP BY product_id HAVING COUNT(DISTINCT category_id) = ")
                .push_bind(category_ids.len() as i64)
                .push(")");
        }
    }
}
