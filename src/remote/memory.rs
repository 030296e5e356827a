//! In-Process Store
//!
//! A `DataStore` kept entirely in memory. It assigns ids and creation
//! timestamps the way the hosted store does, checks declared references,
//! records every call it receives and can be told to fail the next call on a
//! table. Used to exercise the view and the HTTP layer without a network.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::error::{RemoteError, RemoteResult};
use super::query::{same_value, SelectQuery};
use super::DataStore;
use crate::model::{KEY_RESULTS, OBJECTIVES};

/// Kind of store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Select,
    Insert,
}

/// A call received by the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Select(SelectQuery),
    Insert { table: String, rows: Vec<Value> },
}

impl StoreCall {
    pub fn table(&self) -> &str {
        match self {
            StoreCall::Select(query) => &query.table,
            StoreCall::Insert { table, .. } => table,
        }
    }
}

/// Foreign reference `table.column -> target.id`
#[derive(Debug, Clone)]
struct Reference {
    table: String,
    column: String,
    target: String,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Value>>,
    calls: Vec<StoreCall>,
    failures: HashMap<(StoreOp, String), String>,
    next_id: u64,
    clock: i64,
}

/// In-memory table store
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    references: Vec<Reference>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the `key_results.objective_id -> objectives.id` reference
    pub fn okr() -> Self {
        Self::new().with_reference(KEY_RESULTS, "objective_id", OBJECTIVES)
    }

    /// Reject inserts into `table` whose `column` names no row of `target`
    pub fn with_reference(mut self, table: &str, column: &str, target: &str) -> Self {
        self.references.push(Reference {
            table: table.to_string(),
            column: column.to_string(),
            target: target.to_string(),
        });
        self
    }

    /// Insert rows directly, bypassing call recording and failure injection
    pub async fn seed(&self, table: &str, rows: Vec<Value>) -> Vec<Value> {
        let mut inner = self.inner.lock().await;
        let stored: Vec<Value> = rows.into_iter().map(|row| inner.stamp(row)).collect();
        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(stored.iter().cloned());
        stored
    }

    /// Fail the next `op` on `table` with the given service message
    pub async fn fail_next(&self, op: StoreOp, table: &str, message: &str) {
        self.inner
            .lock()
            .await
            .failures
            .insert((op, table.to_string()), message.to_string());
    }

    /// All calls received so far
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().await.calls.clone()
    }

    /// Calls received for one operation kind on one table
    pub async fn calls_to(&self, op: StoreOp, table: &str) -> Vec<StoreCall> {
        self.calls()
            .await
            .into_iter()
            .filter(|call| {
                let kind = match call {
                    StoreCall::Select(_) => StoreOp::Select,
                    StoreCall::Insert { .. } => StoreOp::Insert,
                };
                kind == op && call.table() == table
            })
            .collect()
    }

    /// Current rows of a table
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.inner
            .lock()
            .await
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

impl Inner {
    /// Fill in `id` and `created_at` when the row does not carry them
    fn stamp(&mut self, row: Value) -> Value {
        let mut object = match row {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };

        if !object.contains_key("id") {
            self.next_id += 1;
            object.insert("id".to_string(), Value::from(self.next_id));
        }
        if !object.contains_key("created_at") {
            // Strictly increasing so "newest first" is well defined
            self.clock += 1;
            let base = Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now);
            let at = base + Duration::seconds(self.clock);
            object.insert("created_at".to_string(), Value::from(at.to_rfc3339()));
        }
        Value::Object(object)
    }

    fn take_failure(&mut self, op: StoreOp, table: &str) -> Option<RemoteError> {
        self.failures
            .remove(&(op, table.to_string()))
            .map(RemoteError::Rejected)
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn select(&self, query: &SelectQuery) -> RemoteResult<Vec<Value>> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::Select(query.clone()));
        if let Some(err) = inner.take_failure(StoreOp::Select, &query.table) {
            return Err(err);
        }

        let mut rows: Vec<Value> = inner
            .tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| f.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_fields(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> RemoteResult<Vec<Value>> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::Insert {
            table: table.to_string(),
            rows: rows.clone(),
        });
        if let Some(err) = inner.take_failure(StoreOp::Insert, table) {
            return Err(err);
        }

        for reference in self.references.iter().filter(|r| r.table == table) {
            let targets = inner.tables.get(&reference.target);
            for row in &rows {
                let value = row.get(&reference.column).unwrap_or(&Value::Null);
                let found = targets.is_some_and(|rows| {
                    rows.iter()
                        .any(|target| target.get("id").is_some_and(|id| same_value(id, value)))
                });
                if !found {
                    return Err(RemoteError::ApiError {
                        status: 409,
                        message: format!(
                            "insert or update on table \"{}\" violates foreign key constraint on \"{}\"",
                            table, reference.column
                        ),
                    });
                }
            }
        }

        let stored: Vec<Value> = rows.into_iter().map(|row| inner.stamp(row)).collect();
        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(stored.iter().cloned());
        Ok(stored)
    }
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Null) | None, Some(Value::Null) | None) => Ordering::Equal,
        (Some(Value::Null) | None, _) => Ordering::Less,
        (_, Some(Value::Null) | None) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let store = MemoryStore::new();
        let stored = store.insert(OBJECTIVES, vec![json!({"title": "Grow"})]).await.unwrap();

        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["id"], json!(1));
        assert!(stored[0]["created_at"].is_string());
        assert_eq!(store.rows(OBJECTIVES).await, stored);
    }

    #[tokio::test]
    async fn test_select_orders_newest_first() {
        let store = MemoryStore::new();
        store
            .seed(OBJECTIVES, vec![json!({"title": "old"}), json!({"title": "new"})])
            .await;

        let rows = store
            .select(&SelectQuery::new(OBJECTIVES).order("created_at", false))
            .await
            .unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_select_applies_membership_filter() {
        let store = MemoryStore::new();
        store
            .seed(
                KEY_RESULTS,
                vec![
                    json!({"objective_id": 1, "title": "a"}),
                    json!({"objective_id": 2, "title": "b"}),
                    json!({"objective_id": 3, "title": "c"}),
                ],
            )
            .await;

        let rows = store
            .select(&SelectQuery::new(KEY_RESULTS).in_list("objective_id", vec!["1", "3"]))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_reference_is_enforced() {
        let store = MemoryStore::okr();
        let err = store
            .insert(KEY_RESULTS, vec![json!({"objective_id": "99", "title": "x"})])
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::ApiError { status: 409, .. }));

        store.seed(OBJECTIVES, vec![json!({"title": "o"})]).await;
        store
            .insert(KEY_RESULTS, vec![json!({"objective_id": "1", "title": "x"})])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fail_next_is_consumed_once() {
        let store = MemoryStore::new();
        store.fail_next(StoreOp::Select, OBJECTIVES, "boom").await;

        let err = store.select(&SelectQuery::new(OBJECTIVES)).await.unwrap_err();
        assert_eq!(err.service_message().as_deref(), Some("boom"));
        assert!(store.select(&SelectQuery::new(OBJECTIVES)).await.is_ok());
        assert_eq!(store.calls_to(StoreOp::Select, OBJECTIVES).await.len(), 2);
    }
}
