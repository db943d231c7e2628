pub mod form;
pub mod list;
pub mod repository;
pub mod tabs;

pub use crate::domain::model::{Rate, RateDetails, RateFilter, RateId, RateType, StoredRate};
pub use crate::domain::ports::{BackendClient, ConfigProvider, FormSource, SelectQuery};
pub use crate::utils::error::Result;
