use crate::domain::model::AuthUser;
use crate::domain::ports::{BackendClient, ConfigProvider, EqFilter, SelectQuery};
use crate::utils::error::{RateError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Hosted backend over HTTP: GoTrue-style `auth/v1` for identity and
/// PostgREST-style `rest/v1/<table>` for rows.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base_url: Url,
    api_key: String,
    access_token: Option<String>,
}

impl RestBackend {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| RateError::InvalidConfigValueError {
            field: "backend.url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
            access_token: None,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut backend = Self::new(config.backend_url(), config.api_key())?;
        if let Some(token) = config.access_token() {
            backend = backend.with_access_token(token);
        }
        if let Some(seconds) = config.timeout_seconds() {
            backend = backend.with_timeout(Duration::from_secs(seconds))?;
        }
        Ok(backend)
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RateError::ConfigError {
                message: format!("Cannot build endpoint '{}': {}", path, e),
            })
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        self.endpoint(&format!("rest/v1/{}", table))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        // without a session the project key doubles as the bearer token
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        request
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!("Backend responded {}: {}", status, body);
        Err(RateError::store(error_message(status, &body)))
    }
}

/// PostgREST and GoTrue put the readable reason in `message` (or `msg`).
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(text) = json.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        status.to_string()
    } else {
        body.trim().to_string()
    }
}

fn push_filters(url: &mut Url, filters: &[EqFilter]) {
    let mut pairs = url.query_pairs_mut();
    for filter in filters {
        pairs.append_pair(&filter.column, &format!("eq.{}", filter.value));
    }
}

#[async_trait]
impl BackendClient for RestBackend {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        if self.access_token.is_none() {
            tracing::debug!("No access token configured, treating as signed out");
            return Ok(None);
        }

        let url = self.endpoint("auth/v1/user")?;
        tracing::debug!("Resolving current user via {}", url);
        let response = self.authorized(self.client.get(url)).send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::warn!("Access token rejected by backend");
                Ok(None)
            }
            _ => {
                let user: AuthUser = Self::check(response).await?.json().await?;
                Ok(Some(user))
            }
        }
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let url = self.table_url(table)?;
        tracing::debug!("POST {}", url);

        let response = self
            .authorized(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let body: Value = Self::check(response).await?.json().await?;

        match body {
            Value::Array(mut rows) if !rows.is_empty() => Ok(rows.swap_remove(0)),
            Value::Object(_) => Ok(body),
            _ => Err(RateError::store("Insert succeeded but no row was returned")),
        }
    }

    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("select", "*");
        push_filters(&mut url, &query.filters);
        if let Some(order) = &query.order {
            let direction = if order.descending { "desc" } else { "asc" };
            url.query_pairs_mut()
                .append_pair("order", &format!("{}.{}", order.column, direction));
        }
        tracing::debug!("GET {}", url);

        let response = self.authorized(self.client.get(url)).send().await?;
        let rows: Vec<Value> = Self::check(response).await?.json().await?;
        Ok(rows)
    }

    async fn delete(&self, table: &str, filters: &[EqFilter]) -> Result<()> {
        let mut url = self.table_url(table)?;
        push_filters(&mut url, filters);
        tracing::debug!("DELETE {}", url);

        let response = self.authorized(self.client.delete(url)).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let backend = RestBackend::new("http://localhost:8000/project", "key").unwrap();
        let url = backend.table_url("freight_rates").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/project/rest/v1/freight_rates"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(RestBackend::new("not a url", "key").is_err());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(
                StatusCode::BAD_REQUEST,
                r#"{"code":"23502","message":"null value in column \"price\""}"#
            ),
            "null value in column \"price\""
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream timeout"),
            "upstream timeout"
        );
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "503 Service Unavailable"
        );
    }

    #[test]
    fn test_filters_are_encoded_as_eq() {
        let mut url = Url::parse("http://localhost/rest/v1/freight_rates").unwrap();
        push_filters(
            &mut url,
            &[
                EqFilter::new("user_id", "user-1"),
                EqFilter::new("rate_type", "sea"),
            ],
        );
        assert_eq!(url.query(), Some("user_id=eq.user-1&rate_type=eq.sea"));
    }
}
