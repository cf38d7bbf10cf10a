use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::categorize::{categorize_columns, CategorizeConfig, ColumnCategories};
use crate::error::DataError;
use crate::table::ArrowTable;

/// A loaded dataset and the categorization of its columns
#[derive(Debug, Clone)]
pub struct Dataset {
    pub dataset_id: String,
    pub name: String,
    pub table: ArrowTable,
    pub columns: ColumnCategories,
}

impl Dataset {
    /// Wrap a table under a freshly generated identifier
    pub fn try_new(
        name: impl Into<String>,
        table: ArrowTable,
        config: &CategorizeConfig,
    ) -> Result<Self, DataError> {
        Self::try_new_with_id(uuid::Uuid::new_v4().to_string(), name, table, config)
    }

    pub fn try_new_with_id(
        dataset_id: impl Into<String>,
        name: impl Into<String>,
        table: ArrowTable,
        config: &CategorizeConfig,
    ) -> Result<Self, DataError> {
        let columns = categorize_columns(&table, config)?;
        Ok(Self {
            dataset_id: dataset_id.into(),
            name: name.into(),
            table,
            columns,
        })
    }
}

/// Lookup of datasets by identifier.
///
/// Readers get an `Arc` snapshot, so a dataset replaced mid-request does not affect
/// work already in progress. Inserts are atomic per key.
pub trait DatasetStore: Send + Sync {
    fn get(&self, dataset_id: &str) -> Option<Arc<Dataset>>;

    fn insert(&self, dataset: Dataset) -> Arc<Dataset>;

    fn remove(&self, dataset_id: &str) -> Option<Arc<Dataset>>;

    fn ids(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDatasetStore {
    datasets: Arc<RwLock<HashMap<String, Arc<Dataset>>>>,
}

impl InMemoryDatasetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DatasetStore for InMemoryDatasetStore {
    fn get(&self, dataset_id: &str) -> Option<Arc<Dataset>> {
        let datasets = self.datasets.read().unwrap_or_else(PoisonError::into_inner);
        datasets.get(dataset_id).cloned()
    }

    fn insert(&self, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        let mut datasets = self.datasets.write().unwrap_or_else(PoisonError::into_inner);
        datasets.insert(dataset.dataset_id.clone(), dataset.clone());
        dataset
    }

    fn remove(&self, dataset_id: &str) -> Option<Arc<Dataset>> {
        let mut datasets = self.datasets.write().unwrap_or_else(PoisonError::into_inner);
        datasets.remove(dataset_id)
    }

    fn ids(&self) -> Vec<String> {
        let datasets = self.datasets.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<_> = datasets.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::read_csv_bytes;

    #[test]
    fn test_insert_get_remove() {
        let store = InMemoryDatasetStore::new();
        let table = read_csv_bytes(b"Region,Sales\nEast,1.5\nWest,2.5\n").unwrap();
        let dataset =
            Dataset::try_new_with_id("sales", "sales.csv", table, &CategorizeConfig::default())
                .unwrap();
        assert_eq!(dataset.columns.dimensions, vec!["Region"]);
        assert_eq!(dataset.columns.measures, vec!["Sales"]);

        store.insert(dataset);
        assert_eq!(store.ids(), vec!["sales"]);
        let fetched = store.get("sales").unwrap();
        assert_eq!(fetched.table.num_rows(), 2);

        // Clones share the same map
        let other = store.clone();
        assert!(other.get("sales").is_some());

        assert!(store.remove("sales").is_some());
        assert!(other.get("sales").is_none());
    }
}
