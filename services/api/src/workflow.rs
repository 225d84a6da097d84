//! Pure steps of order placement and the workflow error type

use std::collections::HashMap;

use common::error::DatabaseError;
use thiserror::Error;

use crate::models::orders::RequestedProduct;

/// Failure of a multi-step write
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("No managers found to process this order")]
    NoManagers,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for WorkflowError {
    fn from(e: sqlx::Error) -> Self {
        WorkflowError::Database(e.into())
    }
}

/// Line to insert: `(product_id, quantity, snapshot price)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterializedItem {
    pub product_id: i64,
    pub quantity: i32,
    pub price: f64,
}

/// Reject any requested quantity below one
pub fn validate_quantities(products: &[RequestedProduct]) -> Result<(), WorkflowError> {
    match products.iter().find(|p| p.quantity < 1) {
        Some(p) => Err(WorkflowError::Invalid(format!(
            "Quantity for product {} must be at least 1",
            p.id
        ))),
        None => Ok(()),
    }
}

/// Distinct requested product ids, ascending
pub fn requested_ids(products: &[RequestedProduct]) -> Vec<i64> {
    let mut ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Join the request with the `(id, price)` rows that exist in the catalog.
///
/// Requested ids are keyed by product id, so a repeated id keeps the last
/// quantity. Ids missing from `catalog` are skipped. Output follows the
/// order of `catalog`.
pub fn materialize_items(
    requested: &[RequestedProduct],
    catalog: &[(i64, f64)],
) -> Vec<MaterializedItem> {
    let quantities: HashMap<i64, i32> = requested.iter().map(|p| (p.id, p.quantity)).collect();

    catalog
        .iter()
        .filter_map(|&(product_id, price)| {
            quantities.get(&product_id).map(|&quantity| MaterializedItem {
                product_id,
                quantity,
                price,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requested(id: i64, quantity: i32) -> RequestedProduct {
        RequestedProduct { id, quantity }
    }

    #[test]
    fn test_unknown_products_are_skipped() {
        let items = materialize_items(
            &[requested(1, 2), requested(404, 1), requested(3, 5)],
            &[(1, 10.0), (3, 2.5)],
        );

        assert_eq!(
            items,
            vec![
                MaterializedItem {
                    product_id: 1,
                    quantity: 2,
                    price: 10.0
                },
                MaterializedItem {
                    product_id: 3,
                    quantity: 5,
                    price: 2.5
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_product_keeps_last_quantity() {
        let items = materialize_items(&[requested(1, 2), requested(1, 7)], &[(1, 10.0)]);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 7);
    }

    #[test]
    fn test_no_matches_yields_no_items() {
        assert!(materialize_items(&[requested(9, 1)], &[]).is_empty());
        assert!(materialize_items(&[], &[(1, 1.0)]).is_empty());
    }

    #[test]
    fn test_requested_ids_are_distinct() {
        assert_eq!(
            requested_ids(&[requested(3, 1), requested(1, 1), requested(3, 2)]),
            vec![1, 3]
        );
    }

    #[test]
    fn test_validate_quantities() {
        assert!(validate_quantities(&[requested(1, 1), requested(2, 9)]).is_ok());
        assert!(validate_quantities(&[]).is_ok());

        let err = validate_quantities(&[requested(1, 1), requested(2, 0)]).unwrap_err();
        assert_eq!(err.to_string(), "Quantity for product 2 must be at least 1");
    }
}
