//! Query predicates shared by the local scan and the remote document store.
//!
//! Predicates address fields by name, with `.` separating nested object keys
//! (`"nutrition.calories"`). A document missing the field never matches,
//! including for [`FilterOp::Ne`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Array membership, or substring for string fields.
    Contains,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Predicate {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Evaluates this predicate against a JSON document.
    pub fn matches(&self, doc: &Value) -> bool {
        let Some(actual) = lookup(doc, &self.field) else {
            return false;
        };

        match self.op {
            FilterOp::Eq => values_equal(actual, &self.value),
            FilterOp::Ne => !values_equal(actual, &self.value),
            FilterOp::Lt => compare(actual, &self.value) == Some(Ordering::Less),
            FilterOp::Le => matches!(
                compare(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Gt => compare(actual, &self.value) == Some(Ordering::Greater),
            FilterOp::Ge => matches!(
                compare(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Contains => match (actual, &self.value) {
                (Value::Array(items), needle) => items.iter().any(|v| values_equal(v, needle)),
                (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

/// A built query: conjunction of predicates plus the ordering and limit the
/// caller wants applied to the final, merged result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    pub predicates: Vec<Predicate>,
    pub order_by: Vec<SortOrder>,
    pub limit: Option<usize>,
}

impl QuerySpec {
    /// Returns true if the document satisfies every predicate.
    pub fn matches(&self, doc: &Value) -> bool {
        self.predicates.iter().all(|p| p.matches(doc))
    }

    /// Applies this query's ordering and limit to an already merged result.
    ///
    /// Neither store can guarantee global order or limit across both, so
    /// callers run this after the merge. The sort is stable; values that
    /// cannot be compared keep their relative order.
    pub fn sort_and_limit<T: Serialize>(&self, items: Vec<T>) -> Vec<T> {
        let mut keyed: Vec<(Value, T)> = items
            .into_iter()
            .map(|item| (serde_json::to_value(&item).unwrap_or(Value::Null), item))
            .collect();

        if !self.order_by.is_empty() {
            keyed.sort_by(|(a, _), (b, _)| self.compare_docs(a, b));
        }

        let mut sorted: Vec<T> = keyed.into_iter().map(|(_, item)| item).collect();
        if let Some(limit) = self.limit {
            sorted.truncate(limit);
        }
        sorted
    }

    fn compare_docs(&self, a: &Value, b: &Value) -> Ordering {
        for order in &self.order_by {
            let ord = match (lookup(a, &order.field), lookup(b, &order.field)) {
                (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
                // Documents missing the sort field go last in either direction
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ord = match order.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Fluent builder handed to `query` callers.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    spec: QuerySpec,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.spec.predicates.push(Predicate::new(field, op, value));
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.spec.order_by.push(SortOrder {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.spec.limit = Some(limit);
        self
    }

    pub fn build(self) -> QuerySpec {
        self.spec
    }
}

fn lookup<'a>(doc: &'a Value, field: &str) -> Option<&'a Value> {
    field
        .split('.')
        .try_fold(doc, |current, key| current.as_object()?.get(key))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match compare(a, b) {
        Some(ord) => ord == Ordering::Equal,
        None => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}
