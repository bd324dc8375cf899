//! 商品目录服务库
//! 角色门禁的 HTTP API：令牌签发与校验、角色授权、品牌/分类/商品管理

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
