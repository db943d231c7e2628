pub mod page;

pub use page::{NoopPreparer, RatesPage};
