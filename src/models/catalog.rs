//! Catalog domain models: brands, categories, products

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ==================== Brands ====================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBrandRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBrandRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
}

// ==================== Categories ====================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
}

// ==================== Products ====================

/// `{id, name}` reference used when a product is read with its relations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

/// Product row joined with its brand name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub brand_id: Uuid,
    pub brand_name: String,
    pub description: String,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category link of a product
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductCategoryRow {
    pub product_id: Uuid,
    pub id: Uuid,
    pub name: String,
}

/// Product with brand and categories populated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: NamedRef,
    pub categories: Vec<NamedRef>,
    pub description: String,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn from_row(row: ProductRow, categories: Vec<NamedRef>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: NamedRef {
                id: row.brand_id,
                name: row.brand_name,
            },
            categories,
            description: row.description,
            purchase_price: row.purchase_price,
            selling_price: row.selling_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub brand: Uuid,
    #[validate(length(min = 1))]
    pub categories: Vec<Uuid>,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub purchase_price: f64,
    #[validate(range(min = 0.0))]
    pub selling_price: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub brand: Option<Uuid>,
    #[validate(length(min = 1))]
    pub categories: Option<Vec<Uuid>>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub purchase_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub selling_price: Option<f64>,
}

/// Product list filters. `name` wins over `brand` when both are given.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub name: Option<String>,
    pub brand: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProductFilter {
    All,
    NameContains(String),
    Brand(Uuid),
    HasAllCategories(Vec<Uuid>),
}

impl ProductListQuery {
    pub fn filter(&self) -> ProductFilter {
        match (self.name.as_deref().map(str::trim), self.brand) {
            (Some(name), _) if !name.is_empty() => ProductFilter::NameContains(name.to_string()),
            (_, Some(brand)) => ProductFilter::Brand(brand),
            _ => ProductFilter::All,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductsByCategoriesRequest {
    #[validate(length(min = 1))]
    pub categories: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_filter_wins_over_brand() {
        let query = ProductListQuery {
            name: Some("Sepatu".to_string()),
            brand: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert_eq!(query.filter(), ProductFilter::NameContains("Sepatu".to_string()));
    }

    #[test]
    fn test_blank_name_falls_through() {
        let brand = Uuid::new_v4();
        let query = ProductListQuery {
            name: Some("  ".to_string()),
            brand: Some(brand),
            ..Default::default()
        };
        assert_eq!(query.filter(), ProductFilter::Brand(brand));
        assert_eq!(ProductListQuery::default().filter(), ProductFilter::All);
    }

    #[test]
    fn test_create_product_validation() {
        let req = CreateProductRequest {
            name: "Sepatu Olahraga".to_string(),
            brand: Uuid::new_v4(),
            categories: vec![],
            description: "Produk sepatu olahraga".to_string(),
            purchase_price: 50.0,
            selling_price: -1.0,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("categories"));
        assert!(fields.contains_key("selling_price"));
    }

    #[test]
    fn test_product_serializes_populated_relations() {
        let brand_id = Uuid::new_v4();
        let row = ProductRow {
            id: Uuid::new_v4(),
            name: "Sepatu Olahraga".to_string(),
            brand_id,
            brand_name: "Nike".to_string(),
            description: "Produk sepatu olahraga".to_string(),
            purchase_price: 50.0,
            selling_price: 100.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let category = NamedRef {
            id: Uuid::new_v4(),
            name: "Lari".to_string(),
        };

        let json = serde_json::to_value(Product::from_row(row, vec![category])).unwrap();
        assert_eq!(json["brand"]["name"], "Nike");
        assert_eq!(json["brand"]["id"], brand_id.to_string());
        assert_eq!(json["categories"][0]["name"], "Lari");
        assert_eq!(json["selling_price"], 100.0);
    }
}
