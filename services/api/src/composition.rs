//! Response views for orders and returns
//!
//! Views are assembled from already-loaded rows by pure functions, so the
//! same rows always produce the same output.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{
    Customer,
    catalog::Product,
    orders::{OrderHeader, OrderItem},
    returns::ReturnParts,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: i64,
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone_number: customer.phone_number,
        }
    }
}

/// A product as it appears inside an order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemView {
    /// Product id
    pub id: i64,
    pub model: String,
    pub manufacturer: String,
    /// Price captured when the order was placed
    pub price: f64,
    /// Ordered quantity
    pub quantity: i32,
    pub per_order_limit: Option<i32>,
    pub image_url: Option<String>,
    pub warranty_days: i32,
    pub category_id: Option<i64>,
}

impl OrderItemView {
    /// Overlay an order item on its product. The item's `quantity` and
    /// `price` replace the product's stock and current price.
    pub fn merge(product: &Product, item: &OrderItem) -> Self {
        Self {
            id: product.id,
            model: product.model.clone(),
            manufacturer: product.manufacturer.clone(),
            price: item.price,
            quantity: item.quantity,
            per_order_limit: product.per_order_limit,
            image_url: product.image_url.clone(),
            warranty_days: product.warranty_days,
            category_id: product.category_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub id: i64,
    pub status: String,
    pub creation_time: DateTime<Utc>,
    pub address: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub manager_id: i64,
    pub customer: CustomerView,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnView {
    pub id: i64,
    pub customer: CustomerView,
    pub order_id: i64,
    pub item: OrderItemView,
    pub status: String,
    pub creation_time: DateTime<Utc>,
    pub quantity: i32,
    pub reason: Option<String>,
}

/// Assemble order views in the order of `ids`.
///
/// Ids without a header are skipped. Items are ordered by order item id
/// regardless of the order `lines` arrive in.
pub fn compose_orders(
    ids: &[i64],
    headers: Vec<OrderHeader>,
    lines: Vec<(OrderItem, Product)>,
) -> Vec<OrderView> {
    let mut headers: HashMap<i64, OrderHeader> =
        headers.into_iter().map(|h| (h.id, h)).collect();

    let mut items_by_order: HashMap<i64, Vec<(OrderItem, Product)>> = HashMap::new();
    for (item, product) in lines {
        items_by_order
            .entry(item.order_id)
            .or_default()
            .push((item, product));
    }

    ids.iter()
        .filter_map(|id| {
            let header = headers.remove(id)?;
            let mut lines = items_by_order.remove(id).unwrap_or_default();
            lines.sort_by_key(|(item, _)| item.id);

            Some(OrderView {
                id: header.id,
                status: header.status,
                creation_time: header.creation_time,
                address: header.address,
                order_type: header.order_type,
                manager_id: header.manager_id,
                customer: header.customer.into(),
                items: lines
                    .iter()
                    .map(|(item, product)| OrderItemView::merge(product, item))
                    .collect(),
            })
        })
        .collect()
}

/// Assemble return views in the order of `ids`, skipping unknown ids
pub fn compose_returns(ids: &[i64], parts: Vec<ReturnParts>) -> Vec<ReturnView> {
    let mut parts: HashMap<i64, ReturnParts> =
        parts.into_iter().map(|p| (p.record.id, p)).collect();

    ids.iter()
        .filter_map(|id| parts.remove(id))
        .map(|p| ReturnView {
            id: p.record.id,
            item: OrderItemView::merge(&p.product, &p.item),
            customer: p.customer.into(),
            order_id: p.record.order_id,
            status: p.record.status,
            creation_time: p.record.creation_time,
            quantity: p.record.quantity,
            reason: p.record.reason,
        })
        .collect()
}
