//! In-memory repository.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;
use uuid::Uuid;

use authora_core::{AggregateRoot, Error, Query, ReadResult, Repository, Request, Result, SortDir};

/// In-memory repository over one aggregate type.
///
/// Rows are filtered and sorted against their JSON shape, so the structured
/// query descriptors behave the same way they would against a document
/// store. Intended for tests/dev; not optimized.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    rows: RwLock<HashMap<Uuid, T>>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn to_doc<T: Serialize>(entity: &T) -> Result<JsonValue> {
    serde_json::to_value(entity).map_err(Error::internal)
}

fn field<'a>(doc: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn compare_docs(a: &JsonValue, b: &JsonValue, path: &str) -> core::cmp::Ordering {
    use core::cmp::Ordering;
    match (field(a, path), field(b, path)) {
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => x.cmp(y),
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn run_query<T: Clone + Serialize>(rows: &HashMap<Uuid, T>, query: &Query) -> Result<Vec<T>> {
    let mut matched: Vec<(JsonValue, T)> = Vec::new();
    for row in rows.values() {
        let doc = to_doc(row)?;
        if query.matches(&doc) {
            matched.push((doc, row.clone()));
        }
    }

    for sort in query.sort.iter().rev() {
        matched.sort_by(|(a, _), (b, _)| {
            let ord = compare_docs(a, b, &sort.field);
            match sort.dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            }
        });
    }

    let skip = query.skip.unwrap_or(0) as usize;
    let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);

    Ok(matched
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|(_, row)| row)
        .collect())
}

#[async_trait]
impl<T> Repository<T> for InMemoryRepository<T>
where
    T: AggregateRoot + Clone + Serialize + Send + Sync,
{
    async fn create(&self, entity: &T) -> Result<()> {
        let id = entity.base().id();
        let mut rows = self.rows.write().await;
        if rows.contains_key(&id) {
            return Err(Error::conflict(format!("record {id} already exists")));
        }
        rows.insert(id, entity.clone());
        Ok(())
    }

    async fn read(&self, request: &Request) -> Result<ReadResult<T>> {
        let rows = self.rows.read().await;
        let mut result = ReadResult::new();
        for query in &request.queries {
            let facet = run_query(&rows, query)?;
            result.facets.insert(query.name.clone(), facet);
        }
        Ok(result)
    }

    async fn read_one(&self, request: &Request) -> Result<Option<T>> {
        let Some(query) = request.queries.first() else {
            return Err(Error::validation("request carries no query"));
        };
        let rows = self.rows.read().await;
        Ok(run_query(&rows, query)?.into_iter().next())
    }

    async fn update(&self, entity: &T) -> Result<()> {
        let id = entity.base().id();
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&id) {
            return Err(Error::not_found(format!("record {id}")));
        }
        rows.insert(id, entity.clone());
        Ok(())
    }

    async fn delete(&self, entity: &T) -> Result<()> {
        let id = entity.base().id();
        let mut rows = self.rows.write().await;
        if rows.remove(&id).is_none() {
            return Err(Error::not_found(format!("record {id}")));
        }
        Ok(())
    }
}
