//! Wire shape of a search request
//!
//! Every section is optional and every leaf is loosely typed so that a
//! malformed element reaches the planner, which drops it, instead of
//! failing deserialization of the whole body.

use serde::Deserialize;
use serde_json::Value;

/// `{pagination, filter, sort}` body accepted by every `/search` endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub filter: Option<Filter>,
    #[serde(default)]
    pub sort: Vec<SortItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default, rename = "pageSize")]
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub items: Vec<FilterItem>,
    #[serde(default, rename = "logicOperator")]
    pub logic_operator: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterItem {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SortItem {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub sort: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_a_valid_request() {
        let request: SearchRequest = serde_json::from_str("{}").unwrap();
        assert!(request.pagination.is_none());
        assert!(request.filter.is_none());
        assert!(request.sort.is_empty());
    }

    #[test]
    fn test_camel_case_keys() {
        let request: SearchRequest = serde_json::from_str(
            r#"{
                "pagination": {"page": 2, "pageSize": 25},
                "filter": {
                    "items": [{"field": "price", "operator": ">", "value": 10}],
                    "logicOperator": "or"
                },
                "sort": [{"field": "price", "sort": "desc"}]
            }"#,
        )
        .unwrap();

        let pagination = request.pagination.unwrap();
        assert_eq!(pagination.page, Some(2));
        assert_eq!(pagination.page_size, Some(25));

        let filter = request.filter.unwrap();
        assert_eq!(filter.logic_operator.as_deref(), Some("or"));
        assert_eq!(filter.items[0].value, Some(serde_json::json!(10)));
        assert_eq!(request.sort[0].sort.as_deref(), Some("desc"));
    }

    #[test]
    fn test_item_without_value() {
        let item: FilterItem =
            serde_json::from_str(r#"{"field": "image_url", "operator": "isEmpty"}"#).unwrap();
        assert!(item.value.is_none());
    }
}
