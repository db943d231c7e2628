use crate::core::{BackendClient, SelectQuery};
use crate::domain::model::{AuthUser, NewRateRow, Rate, RateFilter, RateId, StoredRate};
use crate::domain::ports::EqFilter;
use crate::utils::error::{RateError, Result};

pub const DEFAULT_TABLE: &str = "freight_rates";
pub const OWNER_COLUMN: &str = "user_id";

/// Save/load/delete of rates, scoped to the signed-in user.
pub struct RateRepository<B: BackendClient> {
    backend: B,
    table: String,
}

impl<B: BackendClient> RateRepository<B> {
    pub fn new(backend: B) -> Self {
        Self::with_table(backend, DEFAULT_TABLE)
    }

    pub fn with_table(backend: B, table: impl Into<String>) -> Self {
        Self {
            backend,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn require_user(&self) -> Result<AuthUser> {
        self.backend
            .current_user()
            .await?
            .ok_or(RateError::AuthError)
    }

    pub async fn save(&self, rate: &Rate) -> Result<StoredRate> {
        tracing::debug!("Saving {} rate to '{}'", rate.rate_type(), self.table);
        let user = self.require_user().await?;

        let row = serde_json::to_value(NewRateRow {
            user_id: &user.id,
            rate,
        })?;
        let stored = self.backend.insert(&self.table, row).await?;
        let stored: StoredRate = serde_json::from_value(stored)?;

        tracing::info!("Saved {} rate {}", stored.rate_type(), stored.id);
        Ok(stored)
    }

    /// Rates owned by the current user, newest first.
    pub async fn load(&self, filter: RateFilter) -> Result<Vec<StoredRate>> {
        tracing::debug!("Loading rates from '{}' (filter: {})", self.table, filter);
        let user = self.require_user().await?;

        let mut query = SelectQuery::new().eq(OWNER_COLUMN, user.id.as_str());
        if let RateFilter::Only(rate_type) = filter {
            query = query.eq("rate_type", rate_type.as_str());
        }
        let query = query.order_desc("created_at");

        let rows = self.backend.select(&self.table, &query).await?;
        let rates = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<StoredRate>, _>>()?;

        tracing::info!("Loaded {} rates (filter: {})", rates.len(), filter);
        Ok(rates)
    }

    /// Deletes by id only. Ownership is left to the backend's row-level policy.
    pub async fn delete(&self, id: &RateId) -> Result<()> {
        tracing::debug!("Deleting rate {} from '{}'", id, self.table);
        self.backend
            .delete(&self.table, &[EqFilter::new("id", id.as_str())])
            .await?;

        tracing::info!("Deleted rate {}", id);
        Ok(())
    }
}
