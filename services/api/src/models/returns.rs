//! Return models

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Customer, catalog::Product, orders::OrderItem};

/// Stored return row
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnRecord {
    pub id: i64,
    pub status: String,
    pub creation_time: DateTime<Utc>,
    pub quantity: i32,
    pub reason: Option<String>,
    pub order_id: i64,
    pub order_item_id: i64,
}

/// Everything a return view is composed from
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnParts {
    pub record: ReturnRecord,
    pub customer: Customer,
    pub item: OrderItem,
    pub product: Product,
}

/// Body of `POST /api/v0/returns`
#[derive(Debug, Clone, Deserialize)]
pub struct NewReturn {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of `PATCH /api/v0/returns/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnUpdate {
    pub quantity: Option<i32>,
    pub reason: Option<String>,
    pub status: Option<String>,
}
