//! Per-entity allow-lists of searchable fields
//!
//! A field that is not listed here cannot appear in any generated query.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value as Json;

/// SQL type family of a searchable column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Float,
    Text,
    Timestamp,
}

/// A filter value coerced to the type of its column
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// A homogeneous list of coerced values for `isAnyOf`
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarList {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
    Timestamp(Vec<DateTime<Utc>>),
}

impl ColumnKind {
    /// Coerce a JSON value to this kind, or `None` if it does not fit.
    ///
    /// Numbers may arrive as strings; timestamps accept RFC 3339 or a bare
    /// `YYYY-MM-DD` date (midnight UTC).
    pub fn coerce(self, value: &Json) -> Option<Scalar> {
        match self {
            ColumnKind::Int => match value {
                Json::Number(n) => n.as_i64().map(Scalar::Int),
                Json::String(s) => s.trim().parse().ok().map(Scalar::Int),
                _ => None,
            },
            ColumnKind::Float => match value {
                Json::Number(n) => n.as_f64().map(Scalar::Float),
                Json::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(Scalar::Float),
                _ => None,
            },
            ColumnKind::Text => text_of(value).map(Scalar::Text),
            ColumnKind::Timestamp => match value {
                Json::String(s) => parse_timestamp(s.trim()).map(Scalar::Timestamp),
                _ => None,
            },
        }
    }

    /// Coerce every element of a JSON array, keeping those that fit.
    pub fn coerce_list(self, value: &Json) -> Option<ScalarList> {
        let Json::Array(values) = value else {
            return None;
        };
        let scalars = values.iter().filter_map(|v| self.coerce(v));

        let list = match self {
            ColumnKind::Int => ScalarList::Int(
                scalars
                    .filter_map(|s| match s {
                        Scalar::Int(i) => Some(i),
                        _ => None,
                    })
                    .collect(),
            ),
            ColumnKind::Float => ScalarList::Float(
                scalars
                    .filter_map(|s| match s {
                        Scalar::Float(f) => Some(f),
                        _ => None,
                    })
                    .collect(),
            ),
            ColumnKind::Text => ScalarList::Text(
                scalars
                    .filter_map(|s| match s {
                        Scalar::Text(t) => Some(t),
                        _ => None,
                    })
                    .collect(),
            ),
            ColumnKind::Timestamp => ScalarList::Timestamp(
                scalars
                    .filter_map(|s| match s {
                        Scalar::Timestamp(t) => Some(t),
                        _ => None,
                    })
                    .collect(),
            ),
        };

        (!list.is_empty()).then_some(list)
    }
}

impl ScalarList {
    pub fn is_empty(&self) -> bool {
        match self {
            ScalarList::Int(v) => v.is_empty(),
            ScalarList::Float(v) => v.is_empty(),
            ScalarList::Text(v) => v.is_empty(),
            ScalarList::Timestamp(v) => v.is_empty(),
        }
    }
}

/// Text rendering of a scalar JSON value, used by the pattern operators
pub fn text_of(value: &Json) -> Option<String> {
    match value {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// One searchable field: its public name, the SQL expression it reads,
/// and the type filter values are coerced to.
#[derive(Debug, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub expr: &'static str,
    pub kind: ColumnKind,
}

const fn col(field: &'static str, expr: &'static str, kind: ColumnKind) -> Column {
    Column { field, expr, kind }
}

/// Searchable shape of one entity
#[derive(Debug, PartialEq, Eq)]
pub struct EntitySchema {
    pub name: &'static str,
    /// `FROM` clause, aliased
    pub source: &'static str,
    /// Select list for result rows
    pub projection: &'static str,
    /// Unique key expression, the final sort tie-break
    pub key: &'static str,
    pub columns: &'static [Column],
}

impl EntitySchema {
    /// Look up an allow-listed field
    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }
}

use ColumnKind::{Float, Int, Text, Timestamp};

pub static CATEGORIES: EntitySchema = EntitySchema {
    name: "categories",
    source: "categories c",
    projection: "c.id, c.name, c.description",
    key: "c.id",
    columns: &[
        col("id", "c.id", Int),
        col("name", "c.name", Text),
        col("description", "c.description", Text),
    ],
};

pub static CHARACTERISTICS: EntitySchema = EntitySchema {
    name: "characteristics",
    source: "characteristics ch",
    projection: "ch.id, ch.name, ch.measurement_unit",
    key: "ch.id",
    columns: &[
        col("id", "ch.id", Int),
        col("name", "ch.name", Text),
        col("measurement_unit", "ch.measurement_unit", Text),
    ],
};

pub static PRODUCTS: EntitySchema = EntitySchema {
    name: "products",
    source: "products p",
    projection: "p.id, p.model, p.manufacturer, p.price, p.quantity, p.per_order_limit, \
                 p.image_url, p.warranty_days, p.category_id",
    key: "p.id",
    columns: &[
        col("id", "p.id", Int),
        col("model", "p.model", Text),
        col("manufacturer", "p.manufacturer", Text),
        col("price", "p.price", Float),
        col("quantity", "p.quantity", Int),
        col("per_order_limit", "p.per_order_limit", Int),
        col("image_url", "p.image_url", Text),
        col("warranty_days", "p.warranty_days", Int),
        col("category_id", "p.category_id", Int),
    ],
};

pub static CUSTOMERS: EntitySchema = EntitySchema {
    name: "customers",
    source: "customers cu",
    projection: "cu.id, cu.first_name, cu.last_name, cu.email, cu.phone_number",
    key: "cu.id",
    columns: &[
        col("id", "cu.id", Int),
        col("first_name", "cu.first_name", Text),
        col("last_name", "cu.last_name", Text),
        col("email", "cu.email", Text),
        col("phone_number", "cu.phone_number", Int),
    ],
};

/// The password column is neither projected nor searchable
pub static MANAGERS: EntitySchema = EntitySchema {
    name: "managers",
    source: "managers m",
    projection: "m.id, m.first_name, m.last_name, m.email, m.permissions",
    key: "m.id",
    columns: &[
        col("id", "m.id", Int),
        col("first_name", "m.first_name", Text),
        col("last_name", "m.last_name", Text),
        col("email", "m.email", Text),
        col("permissions", "m.permissions", Int),
    ],
};

/// Orders resolve to ids; rows are composed afterwards
pub static ORDERS: EntitySchema = EntitySchema {
    name: "orders",
    source: "orders o",
    projection: "o.id",
    key: "o.id",
    columns: &[
        col("id", "o.id", Int),
        col("status", "o.status", Text),
        col("creation_time", "o.creation_time", Timestamp),
        col("address", "o.address", Text),
        col("type", "o.order_type", Text),
        col("customer_id", "o.customer_id", Int),
        col("manager_id", "o.manager_id", Int),
    ],
};

pub static RETURNS: EntitySchema = EntitySchema {
    name: "returns",
    source: "returns r",
    projection: "r.id",
    key: "r.id",
    columns: &[
        col("id", "r.id", Int),
        col("status", "r.status", Text),
        col("creation_time", "r.creation_time", Timestamp),
        col("quantity", "r.quantity", Int),
        col("reason", "r.reason", Text),
        col("order_id", "r.order_id", Int),
        col("order_item_id", "r.order_item_id", Int),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_coercion() {
        assert_eq!(Int.coerce(&json!(5)), Some(Scalar::Int(5)));
        assert_eq!(Int.coerce(&json!(" 42 ")), Some(Scalar::Int(42)));
        assert_eq!(Int.coerce(&json!(1.5)), None);
        assert_eq!(Int.coerce(&json!("abc")), None);
        assert_eq!(Int.coerce(&json!(null)), None);
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(Float.coerce(&json!(2)), Some(Scalar::Float(2.0)));
        assert_eq!(Float.coerce(&json!("9.99")), Some(Scalar::Float(9.99)));
        assert_eq!(Float.coerce(&json!("NaN")), None);
        assert_eq!(Float.coerce(&json!([1])), None);
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(Text.coerce(&json!("a")), Some(Scalar::Text("a".into())));
        assert_eq!(Text.coerce(&json!(12)), Some(Scalar::Text("12".into())));
        assert_eq!(Text.coerce(&json!({"a": 1})), None);
    }

    #[test]
    fn test_timestamp_coercion() {
        let Some(Scalar::Timestamp(ts)) = Timestamp.coerce(&json!("2024-03-01T10:00:00+02:00"))
        else {
            panic!("expected a timestamp");
        };
        assert_eq!(ts.to_rfc3339(), "2024-03-01T08:00:00+00:00");

        let Some(Scalar::Timestamp(day)) = Timestamp.coerce(&json!("2024-03-01")) else {
            panic!("expected a timestamp");
        };
        assert_eq!(day.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        assert_eq!(Timestamp.coerce(&json!("yesterday")), None);
        assert_eq!(Timestamp.coerce(&json!(1700000000)), None);
    }

    #[test]
    fn test_list_coercion_keeps_fitting_elements() {
        assert_eq!(
            Int.coerce_list(&json!([1, "2", "x", 3.5])),
            Some(ScalarList::Int(vec![1, 2]))
        );
        assert_eq!(Int.coerce_list(&json!(["x"])), None);
        assert_eq!(Int.coerce_list(&json!([])), None);
        assert_eq!(Int.coerce_list(&json!(1)), None);
    }

    #[test]
    fn test_password_is_not_searchable() {
        assert!(MANAGERS.column("password").is_none());
        assert!(!MANAGERS.projection.contains("password"));
    }

    #[test]
    fn test_order_type_maps_to_column() {
        assert_eq!(ORDERS.column("type").map(|c| c.expr), Some("o.order_type"));
    }
}
