//! HTTP 处理器

pub mod auth;
pub mod brand;
pub mod category;
pub mod health;
pub mod product;
pub mod protected;
