use crate::core::repository::RateRepository;
use crate::core::BackendClient;
use crate::domain::model::{RateFilter, RateType, StoredRate};
use crate::utils::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Filter selection for the "my rates" list. Owned by the caller and passed
/// into every render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListState {
    pub filter: RateFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub by_type: BTreeMap<RateType, usize>,
    pub total: usize,
}

impl CategoryCounts {
    pub fn from_rates(rates: &[StoredRate]) -> Self {
        let mut by_type: BTreeMap<RateType, usize> =
            RateType::ALL.into_iter().map(|t| (t, 0)).collect();
        for rate in rates {
            *by_type.entry(rate.rate_type()).or_default() += 1;
        }
        Self {
            by_type,
            total: rates.len(),
        }
    }

    pub fn get(&self, rate_type: RateType) -> usize {
        self.by_type.get(&rate_type).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateRow {
    pub id: String,
    pub rate_type: RateType,
    pub icon: &'static str,
    pub label: &'static str,
    pub route: String,
    pub price: String,
    pub valid_until: String,
    pub created: String,
}

impl From<&StoredRate> for RateRow {
    fn from(stored: &StoredRate) -> Self {
        let rate_type = stored.rate_type();
        Self {
            id: stored.id.to_string(),
            rate_type,
            icon: rate_type.icon(),
            label: rate_type.label(),
            route: stored.rate.details.route(),
            price: format_price(stored.rate.price, &stored.rate.currency),
            valid_until: stored
                .rate
                .valid_until
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            created: stored.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListBody {
    Placeholder { message: String },
    Rows { rows: Vec<RateRow> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateListView {
    #[serde(serialize_with = "serialize_filter")]
    pub filter: RateFilter,
    pub counts: CategoryCounts,
    pub body: ListBody,
}

fn serialize_filter<S: serde::Serializer>(
    filter: &RateFilter,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(filter)
}

impl RateListView {
    pub fn build(filter: RateFilter, rates: &[StoredRate]) -> Self {
        let counts = CategoryCounts::from_rates(rates);
        let body = if rates.is_empty() {
            ListBody::Placeholder {
                message: placeholder_message(filter),
            }
        } else {
            ListBody::Rows {
                rows: rates.iter().map(RateRow::from).collect(),
            }
        };
        Self {
            filter,
            counts,
            body,
        }
    }

    pub fn rows(&self) -> &[RateRow] {
        match &self.body {
            ListBody::Rows { rows } => rows,
            ListBody::Placeholder { .. } => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.body, ListBody::Placeholder { .. })
    }

    /// Plain-text table for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let counts: Vec<String> = RateType::ALL
            .iter()
            .map(|t| format!("{} {}", t.label(), self.counts.get(*t)))
            .collect();
        let _ = writeln!(out, "All {} | {}", self.counts.total, counts.join(" | "));

        match &self.body {
            ListBody::Placeholder { message } => {
                let _ = writeln!(out, "{}", message);
            }
            ListBody::Rows { rows } => {
                let route_width = rows
                    .iter()
                    .map(|r| r.route.chars().count())
                    .max()
                    .unwrap_or(0)
                    .max("Route".len());
                let _ = writeln!(
                    out,
                    "   {:<14} {:<rw$} {:>18} {:<10} {:<10} Id",
                    "Type",
                    "Route",
                    "Price",
                    "Valid",
                    "Created",
                    rw = route_width
                );
                for row in rows {
                    let pad = route_width.saturating_sub(row.route.chars().count());
                    let _ = writeln!(
                        out,
                        "{} {:<14} {}{} {:>18} {:<10} {:<10} {}",
                        row.icon,
                        row.label,
                        row.route,
                        " ".repeat(pad),
                        row.price,
                        row.valid_until,
                        row.created,
                        row.id
                    );
                }
            }
        }
        out
    }

    /// Writes the rows as CSV with a header line. A placeholder writes only the header.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            "id",
            "rate_type",
            "label",
            "route",
            "price",
            "valid_until",
            "created",
        ])?;
        for row in self.rows() {
            csv_writer.write_record([
                row.id.as_str(),
                row.rate_type.as_str(),
                row.label,
                row.route.as_str(),
                row.price.as_str(),
                row.valid_until.as_str(),
                row.created.as_str(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn placeholder_message(filter: RateFilter) -> String {
    match filter {
        RateFilter::All => "No rates saved yet. Add one from any of the rate tabs.".to_string(),
        RateFilter::Only(t) => format!("No {} rates saved yet.", t.label()),
    }
}

/// `1200.0, "USD"` → `1,200.00 USD`.
pub fn format_price(price: f64, currency: &str) -> String {
    let fixed = format!("{:.2}", price);
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{} {}", sign, grouped, cents, currency)
}

/// Loads rates for the given state and turns them into a view.
pub async fn render<B: BackendClient>(
    repository: &RateRepository<B>,
    state: &ListState,
) -> Result<RateListView> {
    let rates = repository.load(state.filter).await?;
    let view = RateListView::build(state.filter, &rates);
    tracing::debug!(
        "Rendered {} rows for filter {}",
        view.rows().len(),
        state.filter
    );
    Ok(view)
}
