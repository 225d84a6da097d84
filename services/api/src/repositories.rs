//! Repositories for database operations

pub mod console;
pub mod customers;
pub mod orders;
pub mod reports;
pub mod returns;
pub mod search;
pub mod statistics;

use sqlx::{Row, postgres::PgRow};

use crate::models::{Customer, catalog::Product, orders::OrderItem};

/// Customer columns, aliased to avoid clashing with the joined entity
pub(crate) const CUSTOMER_COLUMNS: &str = "c.id AS customer_id, c.first_name AS customer_first_name, \
     c.last_name AS customer_last_name, c.email AS customer_email, \
     c.phone_number AS customer_phone_number";

/// Order item columns followed by the columns of its product
pub(crate) const LINE_COLUMNS: &str = "oi.id AS item_id, oi.order_id, oi.quantity AS item_quantity, \
     oi.price AS item_price, p.id AS product_id, p.model, p.manufacturer, p.price, p.quantity, \
     p.per_order_limit, p.image_url, p.warranty_days, p.category_id";

pub(crate) fn customer_from_row(row: &PgRow) -> Customer {
    Customer {
        id: row.get("customer_id"),
        first_name: row.get("customer_first_name"),
        last_name: row.get("customer_last_name"),
        email: row.get("customer_email"),
        phone_number: row.get("customer_phone_number"),
    }
}

pub(crate) fn line_from_row(row: &PgRow) -> (OrderItem, Product) {
    let item = OrderItem {
        id: row.get("item_id"),
        order_id: row.get("order_id"),
        product_id: row.get("product_id"),
        quantity: row.get("item_quantity"),
        price: row.get("item_price"),
    };

    let product = Product {
        id: row.get("product_id"),
        model: row.get("model"),
        manufacturer: row.get("manufacturer"),
        price: row.get("price"),
        quantity: row.get("quantity"),
        per_order_limit: row.get("per_order_limit"),
        image_url: row.get("image_url"),
        warranty_days: row.get("warranty_days"),
        category_id: row.get("category_id"),
    };

    (item, product)
}
