use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::RateError;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Discriminant of a rate, stored in the `rate_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    Sea,
    PreCarriage,
    OnCarriage,
    Terminal,
    Customs,
}

impl RateType {
    pub const ALL: [RateType; 5] = [
        RateType::Sea,
        RateType::PreCarriage,
        RateType::OnCarriage,
        RateType::Terminal,
        RateType::Customs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::Sea => "sea",
            RateType::PreCarriage => "pre_carriage",
            RateType::OnCarriage => "on_carriage",
            RateType::Terminal => "terminal",
            RateType::Customs => "customs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RateType::Sea => "Sea Freight",
            RateType::PreCarriage => "Pre-Carriage",
            RateType::OnCarriage => "On-Carriage",
            RateType::Terminal => "Terminal",
            RateType::Customs => "Customs",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            RateType::Sea => "🚢",
            RateType::PreCarriage => "🚛",
            RateType::OnCarriage => "🚚",
            RateType::Terminal => "🏗",
            RateType::Customs => "📋",
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateType {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        RateType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                RateError::validation(
                    "rate_type",
                    format!(
                        "Unknown rate type '{}'. Expected one of: sea, pre_carriage, on_carriage, terminal, customs",
                        s
                    ),
                )
            })
    }
}

/// Narrowing applied when loading rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateFilter {
    #[default]
    All,
    Only(RateType),
}

impl RateFilter {
    pub fn matches(&self, rate_type: RateType) -> bool {
        match self {
            RateFilter::All => true,
            RateFilter::Only(t) => *t == rate_type,
        }
    }
}

impl fmt::Display for RateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateFilter::All => f.write_str("all"),
            RateFilter::Only(t) => fmt::Display::fmt(t, f),
        }
    }
}

impl FromStr for RateFilter {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(RateFilter::All);
        }
        s.parse().map(RateFilter::Only)
    }
}

/// Variant-specific columns, tagged by `rate_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rate_type", rename_all = "snake_case")]
pub enum RateDetails {
    Sea {
        origin_port: String,
        destination_port: String,
        container_type: Option<String>,
        incoterm: Option<String>,
    },
    PreCarriage {
        origin_city: String,
        destination_port: String,
        country: Option<String>,
        container_type: Option<String>,
    },
    OnCarriage {
        origin_port: String,
        destination_city: String,
        country: Option<String>,
        container_type: Option<String>,
    },
    Terminal {
        port: String,
        container_type: Option<String>,
        #[serde(default, deserialize_with = "null_as_empty")]
        included_services: Vec<String>,
    },
    Customs {
        country: String,
        port: Option<String>,
        #[serde(default, deserialize_with = "null_as_empty")]
        included_services: Vec<String>,
    },
}

impl RateDetails {
    pub fn rate_type(&self) -> RateType {
        match self {
            RateDetails::Sea { .. } => RateType::Sea,
            RateDetails::PreCarriage { .. } => RateType::PreCarriage,
            RateDetails::OnCarriage { .. } => RateType::OnCarriage,
            RateDetails::Terminal { .. } => RateType::Terminal,
            RateDetails::Customs { .. } => RateType::Customs,
        }
    }

    /// Human readable leg, e.g. `TRPOT → USNYC`.
    pub fn route(&self) -> String {
        match self {
            RateDetails::Sea {
                origin_port,
                destination_port,
                ..
            } => format!("{} → {}", origin_port, destination_port),
            RateDetails::PreCarriage {
                origin_city,
                destination_port,
                ..
            } => format!("{} → {}", origin_city, destination_port),
            RateDetails::OnCarriage {
                origin_port,
                destination_city,
                ..
            } => format!("{} → {}", origin_port, destination_city),
            RateDetails::Terminal { port, .. } => port.clone(),
            RateDetails::Customs { country, port, .. } => match port {
                Some(port) => format!("{} / {}", country, port),
                None => country.clone(),
            },
        }
    }
}

/// A rate as collected from a form, before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    #[serde(flatten)]
    pub details: RateDetails,
    #[serde(default, deserialize_with = "price_or_zero")]
    pub price: f64,
    #[serde(default = "default_currency", deserialize_with = "currency_or_default")]
    pub currency: String,
    #[serde(default)]
    pub transit_days: Option<u32>,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Rate {
    pub fn new(details: RateDetails) -> Self {
        Self {
            details,
            price: 0.0,
            currency: default_currency(),
            transit_days: None,
            valid_until: None,
            notes: None,
        }
    }

    pub fn with_price(mut self, price: f64, currency: &str) -> Self {
        self.price = price;
        self.currency = currency.to_ascii_uppercase();
        self
    }

    pub fn rate_type(&self) -> RateType {
        self.details.rate_type()
    }
}

/// Server-generated identifier; PostgREST tables may use uuid or bigint keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RateId(String);

impl RateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RateId {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(RateError::validation("id", "Rate id cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl<'de> Deserialize<'de> for RateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RateId(s),
            Raw::Number(n) => RateId(n.to_string()),
        })
    }
}

/// A row of the rates table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRate {
    pub id: RateId,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub rate: Rate,
}

impl StoredRate {
    pub fn rate_type(&self) -> RateType {
        self.rate.rate_type()
    }
}

/// Insert payload: the owner is attached by the repository, never by the form.
#[derive(Debug, Serialize)]
pub struct NewRateRow<'a> {
    pub user_id: &'a str,
    #[serde(flatten)]
    pub rate: &'a Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn currency_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_currency))
}

fn price_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
