//! Order models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Customer, CustomerInfo};

/// Status every new order starts in
pub const INITIAL_ORDER_STATUS: &str = "processing";

/// Order header together with its customer
#[derive(Debug, Clone, PartialEq)]
pub struct OrderHeader {
    pub id: i64,
    pub status: String,
    pub creation_time: DateTime<Utc>,
    pub address: String,
    pub order_type: String,
    pub manager_id: i64,
    pub customer: Customer,
}

/// One line of an order with the price captured at placement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: f64,
}

/// Requested product and quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RequestedProduct {
    pub id: i64,
    pub quantity: i32,
}

/// Body of `POST /api/v0/orders`
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub customer_info: CustomerInfo,
    #[serde(default)]
    pub products: Vec<RequestedProduct>,
    pub address: String,
    #[serde(rename = "type")]
    pub order_type: String,
}

/// Body of `PATCH /api/v0/orders/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderUpdate {
    pub status: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
}

/// Query parameters of `GET /api/v0/orders`
#[derive(Debug, Clone, Deserialize)]
pub struct OrderListQuery {
    /// Zero-based page number
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
