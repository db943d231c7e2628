use crate::domain::model::AuthUser;
use crate::domain::ports::{BackendClient, EqFilter, SelectQuery};
use crate::utils::error::{RateError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use tokio::sync::Mutex;

const OWNER_COLUMN: &str = "user_id";

#[derive(Default)]
struct State {
    user: Option<AuthUser>,
    tables: HashMap<String, Vec<Value>>,
    last_created: Option<DateTime<Utc>>,
    failure: Option<String>,
}

/// In-process stand-in for the hosted backend.
///
/// Generates `id` and `created_at` on insert and applies the same owner-only
/// row-level policy the hosted table has: reads and deletes only ever see rows
/// whose `user_id` is the signed-in user.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<State>>,
    auth_calls: Arc<AtomicUsize>,
    table_calls: Arc<AtomicUsize>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: &str) -> Self {
        let state = State {
            user: Some(AuthUser {
                id: user_id.to_string(),
                email: None,
            }),
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            ..Self::default()
        }
    }

    pub async fn sign_in(&self, user_id: &str) {
        self.state.lock().await.user = Some(AuthUser {
            id: user_id.to_string(),
            email: None,
        });
    }

    pub async fn sign_out(&self) {
        self.state.lock().await.user = None;
    }

    /// Makes every following table operation fail with `message`.
    pub async fn fail_with(&self, message: &str) {
        self.state.lock().await.failure = Some(message.to_string());
    }

    pub async fn clear_failure(&self) {
        self.state.lock().await.failure = None;
    }

    /// Insert/select/delete calls made so far.
    pub fn table_calls(&self) -> usize {
        self.table_calls.load(AtomicOrdering::SeqCst)
    }

    /// All calls made so far, identity lookups included.
    pub fn calls(&self) -> usize {
        self.auth_calls.load(AtomicOrdering::SeqCst) + self.table_calls()
    }

    /// Rows in `table` regardless of owner.
    pub async fn row_count(&self, table: &str) -> usize {
        self.state
            .lock()
            .await
            .tables
            .get(table)
            .map_or(0, Vec::len)
    }

    fn record_table_call(&self) {
        self.table_calls.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

fn column_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn matches_all(row: &Value, filters: &[EqFilter]) -> bool {
    filters
        .iter()
        .all(|f| column_text(row, &f.column).as_deref() == Some(f.value.as_str()))
}

fn compare_column(a: &Value, b: &Value, column: &str) -> Ordering {
    match (a.get(column), b.get(column)) {
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (
                DateTime::<FixedOffset>::parse_from_rfc3339(x),
                DateTime::<FixedOffset>::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl BackendClient for InMemoryBackend {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        self.auth_calls.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(self.state.lock().await.user.clone())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        self.record_table_call();
        let mut state = self.state.lock().await;
        if let Some(message) = &state.failure {
            return Err(RateError::store(message.clone()));
        }

        let Value::Object(mut fields) = row else {
            return Err(RateError::store("insert payload must be a JSON object"));
        };

        let owner = state.user.as_ref().map(|u| u.id.clone());
        let row_owner = fields.get(OWNER_COLUMN).and_then(Value::as_str);
        if owner.is_none() || row_owner != owner.as_deref() {
            return Err(RateError::store(format!(
                "new row violates row-level security policy for table \"{}\"",
                table
            )));
        }

        // strictly increasing so newest-first ordering is deterministic
        let mut created = Utc::now();
        if let Some(last) = state.last_created {
            if created <= last {
                created = last + Duration::microseconds(1);
            }
        }
        state.last_created = Some(created);

        fields.insert(
            "id".to_string(),
            Value::String(uuid::Uuid::new_v4().to_string()),
        );
        fields.insert("created_at".to_string(), serde_json::to_value(created)?);

        let stored = Value::Object(fields);
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>> {
        self.record_table_call();
        let state = self.state.lock().await;
        if let Some(message) = &state.failure {
            return Err(RateError::store(message.clone()));
        }

        let Some(owner) = state.user.as_ref().map(|u| u.id.as_str()) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<Value> = state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| column_text(row, OWNER_COLUMN).as_deref() == Some(owner))
                    .filter(|row| matches_all(row, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_column(a, b, &order.column);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        Ok(rows)
    }

    async fn delete(&self, table: &str, filters: &[EqFilter]) -> Result<()> {
        self.record_table_call();
        let mut state = self.state.lock().await;
        if let Some(message) = &state.failure {
            return Err(RateError::store(message.clone()));
        }

        let Some(owner) = state.user.as_ref().map(|u| u.id.clone()) else {
            return Ok(());
        };

        if let Some(rows) = state.tables.get_mut(table) {
            let before = rows.len();
            rows.retain(|row| {
                !(column_text(row, OWNER_COLUMN).as_deref() == Some(owner.as_str())
                    && matches_all(row, filters))
            });
            tracing::debug!("In-memory delete removed {} rows", before - rows.len());
        }
        Ok(())
    }
}
