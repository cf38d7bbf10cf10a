use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chartfuse_common::chart::ChartRecord;

/// Lookup of chart records by identifier.
///
/// Records are never mutated in place: `put` stores a new key (or replaces one
/// wholesale) and `get` hands out a shared snapshot.
pub trait ChartRegistry: Send + Sync {
    fn get(&self, chart_id: &str) -> Option<Arc<ChartRecord>>;

    fn put(&self, record: ChartRecord) -> Arc<ChartRecord>;

    fn remove(&self, chart_id: &str) -> Option<Arc<ChartRecord>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryChartRegistry {
    charts: Arc<RwLock<HashMap<String, Arc<ChartRecord>>>>,
}

impl InMemoryChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChartRegistry for InMemoryChartRegistry {
    fn get(&self, chart_id: &str) -> Option<Arc<ChartRecord>> {
        let charts = self.charts.read().unwrap_or_else(PoisonError::into_inner);
        charts.get(chart_id).cloned()
    }

    fn put(&self, record: ChartRecord) -> Arc<ChartRecord> {
        let record = Arc::new(record);
        let mut charts = self.charts.write().unwrap_or_else(PoisonError::into_inner);
        charts.insert(record.chart_id.clone(), record.clone());
        record
    }

    fn remove(&self, chart_id: &str) -> Option<Arc<ChartRecord>> {
        let mut charts = self.charts.write().unwrap_or_else(PoisonError::into_inner);
        charts.remove(chart_id)
    }

    fn len(&self) -> usize {
        self.charts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
