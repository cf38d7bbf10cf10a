use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::strategy::FusionStrategy;
use crate::types::AggOp;
use crate::value::Row;

/// Dimension name to the values a row must match to be kept
pub type ChartFilters = IndexMap<String, Vec<String>>;

/// Generate a fresh opaque chart identifier
pub fn new_chart_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A realized chart: grouping columns, aggregated values and the table they produce.
///
/// Records are immutable once registered. Fusion reads two records and
/// produces a third one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub chart_id: String,
    pub dataset_id: String,

    /// Grouping columns, order matters
    #[serde(default)]
    pub dimensions: Vec<String>,

    /// Aggregated columns. `"count"` is the synthetic row count.
    #[serde(default)]
    pub measures: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agg: Option<AggOp>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub table: Vec<Row>,

    /// For histograms, the continuous column that was binned
    #[serde(
        rename = "originalMeasure",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_measure: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub filters: ChartFilters,

    /// Set on charts produced by fusion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<FusionStrategy>,
}

impl ChartRecord {
    pub fn new<D, M>(dataset_id: impl Into<String>, dimensions: D, measures: M) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            chart_id: new_chart_id(),
            dataset_id: dataset_id.into(),
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            measures: measures.into_iter().map(Into::into).collect(),
            agg: None,
            title: String::new(),
            table: Vec::new(),
            original_measure: None,
            filters: IndexMap::new(),
            strategy: None,
        }
    }

    pub fn with_agg(mut self, agg: AggOp) -> Self {
        self.agg = Some(agg);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_original_measure(mut self, measure: impl Into<String>) -> Self {
        self.original_measure = Some(measure.into());
        self
    }

    pub fn with_table(mut self, table: Vec<Row>) -> Self {
        self.table = table;
        self
    }

    pub fn with_filters(mut self, filters: ChartFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// Request to build a chart from a dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartCreate {
    #[serde(default)]
    pub dataset_id: String,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub measures: Vec<String>,
    #[serde(default)]
    pub agg: AggOp,
    #[serde(default)]
    pub title: Option<String>,

    /// Precomputed rows for charts over synthetic dimensions such as `bin`
    #[serde(default)]
    pub table: Option<Vec<Row>>,

    #[serde(rename = "originalMeasure", default)]
    pub original_measure: Option<String>,

    #[serde(default)]
    pub filters: Option<ChartFilters>,
}
