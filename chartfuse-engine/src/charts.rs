use std::cmp::Ordering;

use chartfuse_common::chart::{ChartCreate, ChartRecord};
use chartfuse_common::title::generate_chart_title;
use chartfuse_common::types::{AggOp, COUNT_MEASURE};
use chartfuse_common::value::{cell_label, display_cell};
use chartfuse_data::{aggregate, apply_filters};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::FusionEngine;
use crate::error::FusionError;

/// A chart's realized table laid out for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTableView {
    pub chart_id: String,
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub total_rows: usize,
}

impl FusionEngine {
    /// Build a chart from a dataset and register it.
    ///
    /// A supplied `table` is stored as is. Otherwise filters are applied and the
    /// dataset is aggregated.
    pub async fn create_chart(&self, spec: ChartCreate) -> Result<ChartRecord, FusionError> {
        let dataset = self.dataset(&spec.dataset_id)?;

        let table = match spec.table {
            Some(rows) => rows,
            None => {
                let filtered = match &spec.filters {
                    Some(filters) if !filters.is_empty() => {
                        apply_filters(&dataset.table, filters).await?
                    }
                    _ => dataset.table.clone(),
                };
                aggregate(&filtered, &spec.dimensions, &spec.measures, spec.agg)
                    .await?
                    .to_rows()?
            }
        };

        let title = match spec.title {
            Some(title) if !title.is_empty() => title,
            _ => generate_chart_title(&spec.dimensions, &spec.measures),
        };
        let measures = if spec.measures.is_empty() && spec.agg == AggOp::Count {
            vec![COUNT_MEASURE.to_string()]
        } else {
            spec.measures
        };

        let mut record = ChartRecord::new(spec.dataset_id, spec.dimensions, measures)
            .with_agg(spec.agg)
            .with_title(title)
            .with_table(table)
            .with_filters(spec.filters.unwrap_or_default());
        record.original_measure = spec.original_measure;

        debug!(
            "Created chart {} with {} rows",
            record.chart_id,
            record.table.len()
        );
        self.charts().put(record.clone());
        Ok(record)
    }

    /// Format a chart's stored table for display
    pub fn chart_table(&self, chart_id: &str) -> Result<ChartTableView, FusionError> {
        let chart = self.chart(chart_id)?;
        let headers: Vec<String> = chart
            .table
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();

        let rows: Vec<Vec<Value>> = chart
            .table
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|header| display_cell(row.get(header).unwrap_or(&Value::Null)))
                    .collect()
            })
            .collect();

        Ok(ChartTableView {
            chart_id: chart.chart_id.clone(),
            title: chart.title.clone(),
            headers,
            total_rows: rows.len(),
            rows,
        })
    }

    /// Distinct non-null values of `dimension` in a chart's table
    pub fn chart_dimension_values(
        &self,
        chart_id: &str,
        dimension: &str,
    ) -> Result<Vec<Value>, FusionError> {
        let chart = self.chart(chart_id)?;
        let mut values: Vec<Value> = vec![];
        for row in &chart.table {
            match row.get(dimension) {
                Some(Value::Null) | None => {}
                Some(value) => {
                    if !values.contains(value) {
                        values.push(value.clone());
                    }
                }
            }
        }
        values.sort_by(compare_cells);
        Ok(values)
    }
}

/// Numbers compare numerically and sort before everything else, which compares by label
fn compare_cells(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => cell_label(a).cmp(&cell_label(b)),
    }
}
