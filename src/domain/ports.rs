use crate::domain::model::{AuthUser, RateType};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Equality predicate on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    pub column: String,
    pub value: String,
}

impl EqFilter {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    pub filters: Vec<EqFilter>,
    pub order: Option<OrderBy>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(EqFilter::new(column, value));
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(OrderBy {
            column: column.into(),
            descending: true,
        });
        self
    }
}

/// Hosted backend capability: identity lookup plus table-scoped row access.
///
/// Implementations report backend failures as `RateError::StoreError` with the
/// backend's own message. A missing session is not an error here: it is
/// `Ok(None)` from [`BackendClient::current_user`].
#[async_trait]
pub trait BackendClient: Send + Sync {
    async fn current_user(&self) -> Result<Option<AuthUser>>;

    /// Inserts one row and returns it as stored, with generated columns filled.
    async fn insert(&self, table: &str, row: Value) -> Result<Value>;

    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>>;

    async fn delete(&self, table: &str, filters: &[EqFilter]) -> Result<()>;
}

/// Where the page's form values come from (input/select elements by name).
pub trait FormSource {
    fn field(&self, name: &str) -> Option<&str>;
}

impl FormSource for std::collections::HashMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl FormSource for std::collections::BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Toast/notification surface.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Per-form initialization owned by the UI: dropdown options and default dates.
pub trait FormPreparer: Send {
    fn populate_dropdowns(&mut self, rate_type: RateType);
    fn apply_default_dates(&mut self, rate_type: RateType);
}

pub trait ConfigProvider: Send + Sync {
    fn backend_url(&self) -> &str;
    fn api_key(&self) -> &str;
    fn access_token(&self) -> Option<&str>;
    fn table(&self) -> &str;
    fn timeout_seconds(&self) -> Option<u64>;
}
