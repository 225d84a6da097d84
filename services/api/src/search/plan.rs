//! Compilation of a search request into SQL
//!
//! `SearchPlan::compile` keeps only what it understands: unknown fields,
//! unknown operators, missing or ill-typed values and unknown sort
//! directions are dropped one element at a time. The select and count
//! queries are rendered from the same predicate list.

use sqlx::{Postgres, QueryBuilder};

use super::request::{FilterItem, SearchRequest, SortItem};
use super::schema::{Column, EntitySchema, Scalar, ScalarList, text_of};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Filter operator table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Ne,
    Contains,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    IsAnyOf,
}

impl Operator {
    /// Map a wire operator name; anything not listed is `None`
    pub fn parse(name: &str) -> Option<Self> {
        let op = match name {
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            "=" | "equals" => Operator::Eq,
            "!=" => Operator::Ne,
            "contains" => Operator::Contains,
            "startsWith" => Operator::StartsWith,
            "endsWith" => Operator::EndsWith,
            "isEmpty" => Operator::IsEmpty,
            "isNotEmpty" => Operator::IsNotEmpty,
            "isAnyOf" => Operator::IsAnyOf,
            _ => return None,
        };
        Some(op)
    }

    fn comparison(self) -> Option<&'static str> {
        match self {
            Operator::Gt => Some(">"),
            Operator::Gte => Some(">="),
            Operator::Lt => Some("<"),
            Operator::Lte => Some("<="),
            Operator::Eq => Some("="),
            Operator::Ne => Some("<>"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogicOperator {
    #[default]
    And,
    Or,
}

impl LogicOperator {
    /// `"or"` selects disjunction, anything else conjunction
    pub fn parse(name: Option<&str>) -> Self {
        match name {
            Some(s) if s.eq_ignore_ascii_case("or") => LogicOperator::Or,
            _ => LogicOperator::And,
        }
    }

    fn joiner(self) -> &'static str {
        match self {
            LogicOperator::And => " AND ",
            LogicOperator::Or => " OR ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Missing direction sorts ascending; an unrecognised one is `None`
    pub fn parse(name: Option<&str>) -> Option<Self> {
        match name {
            None => Some(Direction::Asc),
            Some(s) if s.eq_ignore_ascii_case("asc") => Some(Direction::Asc),
            Some(s) if s.eq_ignore_ascii_case("desc") => Some(Direction::Desc),
            Some(_) => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One retained filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        expr: &'static str,
        op: &'static str,
        value: Scalar,
    },
    /// Case-insensitive match against the text rendering of the column
    Like {
        expr: &'static str,
        pattern: String,
    },
    IsNull(&'static str),
    IsNotNull(&'static str),
    AnyOf {
        expr: &'static str,
        values: ScalarList,
    },
}

impl Predicate {
    fn compile(column: &Column, op: Operator, value: Option<&serde_json::Value>) -> Option<Self> {
        let expr = column.expr;

        match op {
            Operator::IsEmpty => return Some(Predicate::IsNull(expr)),
            Operator::IsNotEmpty => return Some(Predicate::IsNotNull(expr)),
            _ => {}
        }

        let value = value.filter(|v| !v.is_null())?;

        match op {
            Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
                let needle = escape_like(&text_of(value)?);
                let pattern = match op {
                    Operator::Contains => format!("%{}%", needle),
                    Operator::StartsWith => format!("{}%", needle),
                    _ => format!("%{}", needle),
                };
                Some(Predicate::Like { expr, pattern })
            }
            Operator::IsAnyOf => Some(Predicate::AnyOf {
                expr,
                values: column.kind.coerce_list(value)?,
            }),
            _ => Some(Predicate::Compare {
                expr,
                op: op.comparison()?,
                value: column.kind.coerce(value)?,
            }),
        }
    }

    fn push(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        match self {
            Predicate::Compare { expr, op, value } => {
                qb.push(*expr).push(" ").push(*op).push(" ");
                push_scalar(qb, value);
            }
            Predicate::Like { expr, pattern } => {
                qb.push("CAST(")
                    .push(*expr)
                    .push(" AS TEXT) ILIKE ")
                    .push_bind(pattern.clone());
            }
            Predicate::IsNull(expr) => {
                qb.push(*expr).push(" IS NULL");
            }
            Predicate::IsNotNull(expr) => {
                qb.push(*expr).push(" IS NOT NULL");
            }
            Predicate::AnyOf { expr, values } => {
                qb.push(*expr).push(" = ANY(");
                push_list(qb, values);
                qb.push(")");
            }
        }
    }
}

fn push_scalar(qb: &mut QueryBuilder<'static, Postgres>, value: &Scalar) {
    match value {
        Scalar::Int(v) => qb.push_bind(*v),
        Scalar::Float(v) => qb.push_bind(*v),
        Scalar::Text(v) => qb.push_bind(v.clone()),
        Scalar::Timestamp(v) => qb.push_bind(*v),
    };
}

fn push_list(qb: &mut QueryBuilder<'static, Postgres>, values: &ScalarList) {
    match values {
        ScalarList::Int(v) => qb.push_bind(v.clone()),
        ScalarList::Float(v) => qb.push_bind(v.clone()),
        ScalarList::Text(v) => qb.push_bind(v.clone()),
        ScalarList::Timestamp(v) => qb.push_bind(v.clone()),
    };
}

/// Escape `ILIKE` wildcards so the needle matches literally
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Compiled, validated form of a `SearchRequest` for one entity
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub schema: &'static EntitySchema,
    pub predicates: Vec<Predicate>,
    pub logic: LogicOperator,
    pub order_by: Vec<(&'static str, Direction)>,
    pub limit: i64,
    pub offset: i64,
}

impl SearchPlan {
    /// Compile a request against an entity's allow-list. Never fails.
    pub fn compile(schema: &'static EntitySchema, request: &SearchRequest) -> Self {
        let (items, logic) = match &request.filter {
            Some(filter) => (
                filter.items.as_slice(),
                LogicOperator::parse(filter.logic_operator.as_deref()),
            ),
            None => (&[][..], LogicOperator::And),
        };

        let predicates = items
            .iter()
            .filter_map(|item| compile_item(schema, item))
            .collect();

        let mut order_by: Vec<(&'static str, Direction)> = request
            .sort
            .iter()
            .filter_map(|item| compile_sort(schema, item))
            .collect();
        if !order_by.iter().any(|(expr, _)| *expr == schema.key) {
            order_by.push((schema.key, Direction::Asc));
        }

        let (page, page_size) = match &request.pagination {
            Some(p) => (p.page, p.page_size),
            None => (None, None),
        };
        let page = page.unwrap_or(0).max(0);
        let limit = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        Self {
            schema,
            predicates,
            logic,
            order_by,
            limit,
            offset: page.saturating_mul(limit),
        }
    }

    fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        if self.predicates.is_empty() {
            return;
        }

        qb.push(" WHERE ");
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                qb.push(self.logic.joiner());
            }
            qb.push("(");
            predicate.push(qb);
            qb.push(")");
        }
    }

    /// Bounded page of matching rows, in the schema's projection
    pub fn select_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM {}",
            self.schema.projection, self.schema.source
        ));
        self.push_where(&mut qb);

        qb.push(" ORDER BY ");
        for (i, (expr, direction)) in self.order_by.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(*expr).push(" ").push(direction.sql());
        }

        qb.push(" LIMIT ").push_bind(self.limit);
        qb.push(" OFFSET ").push_bind(self.offset);
        qb
    }

    /// Number of rows matching the filter, ignoring pagination
    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.schema.source));
        self.push_where(&mut qb);
        qb
    }
}

fn compile_item(schema: &EntitySchema, item: &FilterItem) -> Option<Predicate> {
    let column = schema.column(&item.field)?;
    let op = Operator::parse(&item.operator)?;
    Predicate::compile(column, op, item.value.as_ref())
}

fn compile_sort(schema: &EntitySchema, item: &SortItem) -> Option<(&'static str, Direction)> {
    let column = schema.column(&item.field)?;
    let direction = Direction::parse(item.sort.as_deref())?;
    Some((column.expr, direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::request::{Filter, Pagination};
    use crate::search::schema::{ORDERS, PRODUCTS};
    use serde_json::json;

    fn item(field: &str, operator: &str, value: serde_json::Value) -> FilterItem {
        FilterItem {
            field: field.to_string(),
            operator: operator.to_string(),
            value: Some(value),
        }
    }

    fn filtered(items: Vec<FilterItem>, logic: Option<&str>) -> SearchRequest {
        SearchRequest {
            filter: Some(Filter {
                items,
                logic_operator: logic.map(str::to_string),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_operator_table() {
        assert_eq!(Operator::parse("equals"), Some(Operator::Eq));
        assert_eq!(Operator::parse("="), Some(Operator::Eq));
        assert_eq!(Operator::parse("isAnyOf"), Some(Operator::IsAnyOf));
        assert_eq!(Operator::parse("between"), None);
        assert_eq!(Operator::parse("CONTAINS"), None);
        assert_eq!(Operator::parse(""), None);
    }

    #[test]
    fn test_defaults() {
        let plan = SearchPlan::compile(&PRODUCTS, &SearchRequest::default());
        assert!(plan.predicates.is_empty());
        assert_eq!(plan.logic, LogicOperator::And);
        assert_eq!(plan.order_by, vec![("p.id", Direction::Asc)]);
        assert_eq!(plan.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(plan.offset, 0);

        let qb = plan.select_query();
        assert_eq!(
            qb.sql(),
            "SELECT p.id, p.model, p.manufacturer, p.price, p.quantity, p.per_order_limit, \
             p.image_url, p.warranty_days, p.category_id FROM products p \
             ORDER BY p.id ASC LIMIT $1 OFFSET $2"
        );
        assert_eq!(plan.count_query().sql(), "SELECT COUNT(*) FROM products p");
    }

    #[test]
    fn test_pagination_bounds() {
        let paged = |page, page_size| {
            let request = SearchRequest {
                pagination: Some(Pagination { page, page_size }),
                ..Default::default()
            };
            let plan = SearchPlan::compile(&PRODUCTS, &request);
            (plan.limit, plan.offset)
        };

        assert_eq!(paged(Some(3), Some(20)), (20, 60));
        assert_eq!(paged(Some(-4), Some(20)), (20, 0));
        assert_eq!(paged(Some(1), Some(0)), (1, 1));
        assert_eq!(paged(Some(2), Some(50_000)), (MAX_PAGE_SIZE, 2 * MAX_PAGE_SIZE));
        assert_eq!(paged(Some(i64::MAX), Some(10)), (10, i64::MAX));
    }

    #[test]
    fn test_unknown_field_is_same_as_omitted() {
        let kept = item("price", ">", json!(10));
        let with_unknown = filtered(
            vec![kept.clone(), item("password", "=", json!("x"))],
            None,
        );
        let without = filtered(vec![kept], None);

        assert_eq!(
            SearchPlan::compile(&PRODUCTS, &with_unknown),
            SearchPlan::compile(&PRODUCTS, &without)
        );
    }

    #[test]
    fn test_invalid_items_are_dropped() {
        let request = filtered(
            vec![
                item("price", "between", json!([1, 2])),
                item("quantity", ">", json!("many")),
                item("category_id", "isAnyOf", json!(["x"])),
                FilterItem {
                    field: "model".into(),
                    operator: "contains".into(),
                    value: None,
                },
                item("model", "=", json!(null)),
            ],
            Some("or"),
        );

        let plan = SearchPlan::compile(&PRODUCTS, &request);
        assert!(plan.predicates.is_empty());
        assert_eq!(plan.count_query().sql(), "SELECT COUNT(*) FROM products p");
    }

    #[test]
    fn test_null_checks_need_no_value() {
        let request = filtered(
            vec![
                FilterItem {
                    field: "image_url".into(),
                    operator: "isEmpty".into(),
                    value: None,
                },
                item("per_order_limit", "isNotEmpty", json!("ignored")),
            ],
            None,
        );

        let plan = SearchPlan::compile(&PRODUCTS, &request);
        assert_eq!(
            plan.count_query().sql(),
            "SELECT COUNT(*) FROM products p WHERE (p.image_url IS NULL) AND (p.per_order_limit IS NOT NULL)"
        );
    }

    #[test]
    fn test_select_and_count_share_predicates() {
        let mut request = filtered(
            vec![
                item("price", ">=", json!(9.5)),
                item("model", "contains", json!("50%_off")),
                item("category_id", "isAnyOf", json!([1, "2", "x"])),
                item("quantity", "!=", json!(0)),
            ],
            Some("or"),
        );
        request.sort = vec![
            SortItem {
                field: "price".into(),
                sort: Some("desc".into()),
            },
            SortItem {
                field: "secret".into(),
                sort: Some("asc".into()),
            },
            SortItem {
                field: "model".into(),
                sort: Some("sideways".into()),
            },
        ];

        let plan = SearchPlan::compile(&PRODUCTS, &request);
        assert_eq!(
            plan.predicates[1],
            Predicate::Like {
                expr: "p.model",
                pattern: "%50\\%\\_off%".into()
            }
        );
        assert_eq!(
            plan.predicates[2],
            Predicate::AnyOf {
                expr: "p.category_id",
                values: ScalarList::Int(vec![1, 2])
            }
        );

        let predicate_sql = "(p.price >= $1) OR (CAST(p.model AS TEXT) ILIKE $2) \
                             OR (p.category_id = ANY($3)) OR (p.quantity <> $4)";

        let count = plan.count_query();
        assert_eq!(
            count.sql(),
            format!("SELECT COUNT(*) FROM products p WHERE {}", predicate_sql)
        );

        let select = plan.select_query();
        assert!(select.sql().contains(&format!(" WHERE {} ORDER BY", predicate_sql)));
        assert!(
            select
                .sql()
                .ends_with("ORDER BY p.price DESC, p.id ASC LIMIT $5 OFFSET $6")
        );
    }

    #[test]
    fn test_key_sort_is_not_duplicated() {
        let request = SearchRequest {
            sort: vec![SortItem {
                field: "id".into(),
                sort: Some("DESC".into()),
            }],
            ..Default::default()
        };

        let plan = SearchPlan::compile(&ORDERS, &request);
        assert_eq!(plan.order_by, vec![("o.id", Direction::Desc)]);
    }

    #[test]
    fn test_logic_operator_parsing() {
        assert_eq!(LogicOperator::parse(Some("or")), LogicOperator::Or);
        assert_eq!(LogicOperator::parse(Some("OR")), LogicOperator::Or);
        assert_eq!(LogicOperator::parse(Some("xor")), LogicOperator::And);
        assert_eq!(LogicOperator::parse(None), LogicOperator::And);
    }

    #[test]
    fn test_timestamp_filter_on_orders() {
        let request = filtered(
            vec![
                item("creation_time", ">", json!("2024-01-01")),
                item("type", "=", json!("pickup")),
            ],
            None,
        );

        let plan = SearchPlan::compile(&ORDERS, &request);
        assert_eq!(
            plan.count_query().sql(),
            "SELECT COUNT(*) FROM orders o WHERE (o.creation_time > $1) AND (o.order_type = $2)"
        );
    }
}
