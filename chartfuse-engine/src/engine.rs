use std::sync::Arc;

use chartfuse_common::chart::ChartRecord;
use chartfuse_data::profile::{self, DimensionCounts, HistogramSummary};
use chartfuse_data::{ArrowTable, Dataset, DatasetStore, InMemoryDatasetStore};
use log::info;

use crate::config::EngineConfig;
use crate::error::FusionError;
use crate::registry::{ChartRegistry, InMemoryChartRegistry};

/// Entry point for chart creation and fusion.
///
/// The engine holds no state of its own beyond its configuration. Datasets and
/// charts live in the injected stores, so several engines can share them.
#[derive(Clone)]
pub struct FusionEngine {
    datasets: Arc<dyn DatasetStore>,
    charts: Arc<dyn ChartRegistry>,
    config: EngineConfig,
}

impl FusionEngine {
    pub fn new(
        datasets: Arc<dyn DatasetStore>,
        charts: Arc<dyn ChartRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            datasets,
            charts,
            config,
        }
    }

    /// Engine backed by fresh in-memory stores
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryDatasetStore::new()),
            Arc::new(InMemoryChartRegistry::new()),
            EngineConfig::default(),
        )
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn datasets(&self) -> &Arc<dyn DatasetStore> {
        &self.datasets
    }

    pub fn charts(&self) -> &Arc<dyn ChartRegistry> {
        &self.charts
    }

    /// Categorize a table's columns and register it under a new identifier
    pub fn add_dataset(
        &self,
        name: impl Into<String>,
        table: ArrowTable,
    ) -> Result<Arc<Dataset>, FusionError> {
        let dataset = Dataset::try_new(name, table, &self.config.categorize)?;
        info!(
            "Registered dataset {} ({} rows, {} dimensions, {} measures)",
            dataset.dataset_id,
            dataset.table.num_rows(),
            dataset.columns.dimensions.len(),
            dataset.columns.measures.len()
        );
        Ok(self.datasets.insert(dataset))
    }

    pub fn dataset(&self, dataset_id: &str) -> Result<Arc<Dataset>, FusionError> {
        self.datasets
            .get(dataset_id)
            .ok_or_else(|| FusionError::DatasetNotFound(dataset_id.to_string()))
    }

    pub fn chart(&self, chart_id: &str) -> Result<Arc<ChartRecord>, FusionError> {
        self.charts
            .get(chart_id)
            .ok_or_else(|| FusionError::ChartNotFound(chart_id.to_string()))
    }

    pub fn histogram(
        &self,
        dataset_id: &str,
        measure: &str,
    ) -> Result<HistogramSummary, FusionError> {
        let dataset = self.dataset(dataset_id)?;
        Ok(profile::histogram(&dataset.table, measure)?)
    }

    pub async fn dimension_counts(
        &self,
        dataset_id: &str,
        dimension: &str,
    ) -> Result<DimensionCounts, FusionError> {
        let dataset = self.dataset(dataset_id)?;
        Ok(profile::dimension_counts(&dataset.table, dimension).await?)
    }
}
