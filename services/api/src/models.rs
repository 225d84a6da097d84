//! Data models for the API service

pub mod catalog;
pub mod orders;
pub mod returns;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use common::Permissions;

/// Customer entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: i64,
}

/// Customer-identifying tuple supplied with an order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: i64,
}

/// Manager row as exposed by search, without the password hash
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ManagerSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub permissions: Permissions,
}
