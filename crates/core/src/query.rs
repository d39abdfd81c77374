//! Structured query descriptors.
//!
//! Queries are filter/sort descriptors, not raw query strings. A request
//! carries one or more named queries; the repository answers with one facet
//! of typed rows per query name, so no runtime type registry is needed to
//! decode results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Comparison operator for a filter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Contains,
}

/// A single field filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: Op,
    pub value: JsonValue,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.into(),
            op: Op::Eq,
            value: value.into(),
        }
    }

    /// Evaluate this filter against a document in JSON shape.
    ///
    /// Dotted field paths descend into nested objects.
    pub fn matches(&self, doc: &JsonValue) -> bool {
        let actual = lookup(doc, &self.field);
        match self.op {
            Op::Eq => actual == Some(&self.value),
            Op::Ne => actual != Some(&self.value),
            Op::Gt => compare(actual, &self.value).is_some_and(|o| o.is_gt()),
            Op::Gte => compare(actual, &self.value).is_some_and(|o| o.is_ge()),
            Op::Lt => compare(actual, &self.value).is_some_and(|o| o.is_lt()),
            Op::Lte => compare(actual, &self.value).is_some_and(|o| o.is_le()),
            Op::In => match (&self.value, actual) {
                (JsonValue::Array(candidates), Some(v)) => candidates.contains(v),
                _ => false,
            },
            Op::Contains => match actual {
                Some(JsonValue::Array(items)) => items.contains(&self.value),
                Some(JsonValue::String(s)) => self
                    .value
                    .as_str()
                    .is_some_and(|needle| s.contains(needle)),
                _ => false,
            },
        }
    }
}

fn lookup<'a>(doc: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn compare(actual: Option<&JsonValue>, expected: &JsonValue) -> Option<core::cmp::Ordering> {
    match (actual?, expected) {
        (JsonValue::Number(a), JsonValue::Number(b)) => {
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (JsonValue::String(a), JsonValue::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Sort direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    Asc,
    Desc,
}

/// A sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub dir: SortDir,
}

/// A named query: filters plus optional sort/pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub name: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub sort: Vec<Sort>,
    #[serde(default)]
    pub skip: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl Query {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filters: Vec::new(),
            sort: Vec::new(),
            skip: None,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn matches(&self, doc: &JsonValue) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }
}

/// A request bundling one or more named queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub queries: Vec<Query>,
}

impl Request {
    pub fn new(queries: Vec<Query>) -> Self {
        Self { queries }
    }

    /// The common single-facet lookup: one query named "one" with the given
    /// filters.
    pub fn one(filters: Vec<Filter>) -> Self {
        Self {
            queries: vec![Query {
                name: "one".to_string(),
                filters,
                sort: Vec::new(),
                skip: None,
                limit: None,
            }],
        }
    }
}

/// Faceted read result: one list of typed rows per query name.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadResult<T> {
    pub facets: BTreeMap<String, Vec<T>>,
}

impl<T> ReadResult<T> {
    pub fn new() -> Self {
        Self {
            facets: BTreeMap::new(),
        }
    }

    pub fn facet(&self, name: &str) -> &[T] {
        self.facets.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn into_facet(mut self, name: &str) -> Vec<T> {
        self.facets.remove(name).unwrap_or_default()
    }
}

impl<T> Default for ReadResult<T> {
    fn default() -> Self {
        Self::new()
    }
}
