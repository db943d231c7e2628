pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{InMemoryBackend, RestBackend};
pub use app::{NoopPreparer, RatesPage};
pub use config::{toml_config::TomlConfig, BackendSettings};
pub use crate::core::{list::RateListView, repository::RateRepository, tabs::Tab};
pub use domain::model::{Rate, RateDetails, RateFilter, RateId, RateType, StoredRate};
pub use utils::error::{RateError, Result};
