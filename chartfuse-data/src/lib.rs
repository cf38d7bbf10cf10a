pub mod aggregate;
pub mod categorize;
pub mod csv;
pub mod error;
pub mod profile;
pub mod store;
pub mod table;

pub use aggregate::{aggregate, aggregate_measure, apply_filters, grouped_count, project_non_null};
pub use store::{Dataset, DatasetStore, InMemoryDatasetStore};
pub use table::ArrowTable;
