//! Catalog entities

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Characteristic {
    pub id: i64,
    pub name: String,
    pub measurement_unit: Option<String>,
}

/// Product entity; `price` is the current catalog price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub model: String,
    pub manufacturer: String,
    pub price: f64,
    pub quantity: i32,
    pub per_order_limit: Option<i32>,
    pub image_url: Option<String>,
    pub warranty_days: i32,
    pub category_id: Option<i64>,
}
