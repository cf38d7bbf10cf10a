//! Merging two charts of the same dataset into a new chart.
//!
//! [`FusionPlan::select`] classifies the pair and picks exactly one case, checked
//! in a fixed order (first match wins):
//!
//! 1. same dimensions, different measures
//! 2. one shared measure, different dimensions
//! 3. histogram with dimension count
//! 4. histogram with histogram
//! 5. dimension count with dimension count
//! 6. any shared dimension with at least two measures overall
//!
//! [`FusionEngine::fuse`] then realizes the plan against the dataset and registers
//! the result.

use chartfuse_common::chart::ChartRecord;
use chartfuse_common::strategy::StrategyKind;
use chartfuse_common::types::{AggOp, COUNT_MEASURE};
use chartfuse_common::value::{cell_label, Row};
use chartfuse_data::{aggregate, aggregate_measure, grouped_count, project_non_null, ArrowTable};
use log::debug;
use serde_json::Value;

use crate::engine::FusionEngine;
use crate::error::FusionError;
use crate::shape::{
    common_dimensions, measure_union, same_dimension_different_measures,
    same_measure_different_dimensions, shared_measures, ChartShape,
};

/// Output column of the dimension-vs-dimension frequency table
pub const FREQUENCY_COLUMN: &str = "Count";

/// How a pair of charts will be merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FusionPlan {
    /// Aggregate the union of measures over the shared grouping
    SameDimension {
        dimensions: Vec<String>,
        measures: Vec<String>,
    },
    /// Both charts have a dimension: aggregate the shared measure over both
    StackedMeasure {
        first: String,
        second: String,
        measure: String,
    },
    /// At least one chart is a total: aggregate each side separately and stack
    /// the results in long format
    MeasureAcrossDimensions {
        measure: String,
        left: Vec<String>,
        right: Vec<String>,
    },
    /// The histogram's underlying measure aggregated by the counted dimension
    SemanticMerge { dimension: String, measure: String },
    /// Row-level pairs of two histogram measures
    MeasureVsMeasure { left: String, right: String },
    /// Joint frequency of two counted dimensions
    DimensionVsDimension { left: String, right: String },
    /// Union of measures over the first shared dimension that exists in the dataset
    CommonDimension {
        dimensions: Vec<String>,
        measures: Vec<String>,
    },
}

impl FusionPlan {
    /// Pick a plan and its aggregation for `c1` and `c2`.
    ///
    /// The aggregation is the first one set on the inputs, in priority order, falling
    /// back to `default_agg`.
    pub fn select(
        c1: &ChartRecord,
        c2: &ChartRecord,
        default_agg: AggOp,
    ) -> Result<(Self, AggOp), FusionError> {
        let pair_agg = AggOp::pick(&[c1.agg, c2.agg]).unwrap_or(default_agg);

        if same_dimension_different_measures(c1, c2) {
            let plan = Self::SameDimension {
                dimensions: c1.dimensions.clone(),
                measures: measure_union(c1, c2),
            };
            return Ok((plan, pair_agg));
        }

        if same_measure_different_dimensions(c1, c2) {
            let measure = shared_measures(c1, c2)
                .first()
                .map(|m| m.to_string())
                .ok_or_else(|| FusionError::InternalError("no shared measure".to_string()))?;
            let plan = match (c1.dimensions.first(), c2.dimensions.first()) {
                (Some(first), Some(second)) => Self::StackedMeasure {
                    first: first.clone(),
                    second: second.clone(),
                    measure,
                },
                _ => Self::MeasureAcrossDimensions {
                    measure,
                    left: c1.dimensions.clone(),
                    right: c2.dimensions.clone(),
                },
            };
            return Ok((plan, pair_agg));
        }

        match (ChartShape::of(c1), ChartShape::of(c2)) {
            (ChartShape::Histogram { measure }, ChartShape::DimensionCount { dimension }) => {
                let plan = Self::SemanticMerge { dimension, measure };
                return Ok((plan, pair_agg));
            }
            (ChartShape::DimensionCount { dimension }, ChartShape::Histogram { measure }) => {
                // The histogram's agg takes precedence
                let agg = AggOp::pick(&[c2.agg, c1.agg]).unwrap_or(default_agg);
                return Ok((Self::SemanticMerge { dimension, measure }, agg));
            }
            (ChartShape::Histogram { measure: left }, ChartShape::Histogram { measure: right }) => {
                return Ok((Self::MeasureVsMeasure { left, right }, pair_agg));
            }
            (
                ChartShape::DimensionCount { dimension: left },
                ChartShape::DimensionCount { dimension: right },
            ) => {
                return Ok((Self::DimensionVsDimension { left, right }, pair_agg));
            }
            _ => {}
        }

        let dimensions = common_dimensions(c1, c2);
        let measures = measure_union(c1, c2);
        if !dimensions.is_empty() && measures.len() >= 2 {
            return Ok((
                Self::CommonDimension {
                    dimensions,
                    measures,
                },
                pair_agg,
            ));
        }

        Err(FusionError::UnsupportedShape)
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::SameDimension { .. } | Self::CommonDimension { .. } => {
                StrategyKind::SameDimensionDifferentMeasures
            }
            Self::StackedMeasure { .. } => StrategyKind::SameMeasureDifferentDimensionsStacked,
            Self::MeasureAcrossDimensions { .. } => StrategyKind::SameMeasureDifferentDimensions,
            Self::SemanticMerge { .. } => StrategyKind::HistogramDimensionSemanticMerge,
            Self::MeasureVsMeasure { .. } => StrategyKind::MeasureVsMeasure,
            Self::DimensionVsDimension { .. } => StrategyKind::DimensionVsDimension,
        }
    }

    /// Compute the fused table against `table`
    pub async fn realize(&self, table: &ArrowTable, agg: AggOp) -> Result<FusedChart, FusionError> {
        let fused = match self {
            Self::SameDimension {
                dimensions,
                measures,
            } => FusedChart {
                title: combined_title(measures, dimensions),
                rows: aggregate(table, dimensions, measures, agg).await?.to_rows()?,
                dimensions: dimensions.clone(),
                measures: measures.clone(),
            },
            Self::StackedMeasure {
                first,
                second,
                measure,
            } => {
                let mut dimensions = vec![first.clone()];
                // Both charts may lead with the same dimension
                if second != first {
                    dimensions.push(second.clone());
                }
                let stacked = aggregate_measure(table, &dimensions, measure, agg).await?;
                FusedChart {
                    title: format!("Stacked Bar: {measure} by {first} vs {second}"),
                    rows: stacked.to_rows()?,
                    dimensions,
                    measures: vec![measure.clone()],
                }
            }
            Self::MeasureAcrossDimensions {
                measure,
                left,
                right,
            } => {
                let mut rows = labeled_totals(table, left, measure, agg).await?;
                rows.extend(labeled_totals(table, right, measure, agg).await?);

                let mut dimensions = left.clone();
                for dimension in right {
                    if !dimensions.contains(dimension) {
                        dimensions.push(dimension.clone());
                    }
                }
                FusedChart {
                    title: format!("Comparison: {measure} across different dimensions"),
                    rows,
                    dimensions,
                    measures: vec![measure.clone()],
                }
            }
            Self::SemanticMerge { dimension, measure } => {
                // Both must be real columns, including a recovered originalMeasure
                table.require_column(dimension)?;
                table.require_column(measure)?;
                let dimensions = vec![dimension.clone()];
                let measures = vec![measure.clone()];
                FusedChart {
                    title: format!("{measure} by {dimension}"),
                    rows: aggregate(table, &dimensions, &measures, agg)
                        .await?
                        .to_rows()?,
                    dimensions,
                    measures,
                }
            }
            Self::MeasureVsMeasure { left, right } => {
                let measures = vec![left.clone(), right.clone()];
                FusedChart {
                    title: format!("{left} vs {right}"),
                    rows: project_non_null(table, &measures).await?,
                    dimensions: vec![],
                    measures,
                }
            }
            Self::DimensionVsDimension { left, right } => {
                let dimensions = vec![left.clone(), right.clone()];
                FusedChart {
                    title: format!("{left} vs {right} (frequency)"),
                    rows: grouped_count(table, &dimensions, FREQUENCY_COLUMN)
                        .await?
                        .to_rows()?,
                    dimensions,
                    measures: vec![FREQUENCY_COLUMN.to_string()],
                }
            }
            Self::CommonDimension {
                dimensions,
                measures,
            } => {
                let dimension = dimensions
                    .iter()
                    .find(|d| table.has_column(d))
                    .ok_or(FusionError::NoCommonDimension)?;
                let dimensions = vec![dimension.clone()];
                FusedChart {
                    title: combined_title(measures, &dimensions),
                    rows: aggregate(table, &dimensions, measures, agg).await?.to_rows()?,
                    dimensions,
                    measures: measures.clone(),
                }
            }
        };
        Ok(fused)
    }
}

/// Realized output of a plan, before it becomes a chart record
#[derive(Debug, Clone, PartialEq)]
pub struct FusedChart {
    pub dimensions: Vec<String>,
    pub measures: Vec<String>,
    pub title: String,
    pub rows: Vec<Row>,
}

fn combined_title(measures: &[String], dimensions: &[String]) -> String {
    format!(
        "Combined: {} by {}",
        measures.join(", "),
        dimensions.join(", ")
    )
}

/// Aggregate `measure` over `dimensions` and relabel each row as
/// `DimensionType`, `DimensionValue`, `Value`
async fn labeled_totals(
    table: &ArrowTable,
    dimensions: &[String],
    measure: &str,
    agg: AggOp,
) -> Result<Vec<Row>, FusionError> {
    let aggregated = aggregate(table, dimensions, &[measure.to_string()], agg).await?;
    let value_column = if agg == AggOp::Count {
        COUNT_MEASURE
    } else {
        measure
    };
    let dimension_type = if dimensions.is_empty() {
        "(none)".to_string()
    } else {
        dimensions.join(",")
    };

    let rows = aggregated
        .to_rows()?
        .into_iter()
        .map(|row| {
            let dimension_value = if dimensions.is_empty() {
                "(total)".to_string()
            } else {
                dimensions
                    .iter()
                    .map(|d| row.get(d).map(cell_label).unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(" | ")
            };
            let mut labeled = Row::with_capacity(3);
            labeled.insert(
                "DimensionType".to_string(),
                Value::String(dimension_type.clone()),
            );
            labeled.insert(
                "DimensionValue".to_string(),
                Value::String(dimension_value),
            );
            labeled.insert(
                "Value".to_string(),
                row.get(value_column).cloned().unwrap_or(Value::Null),
            );
            labeled
        })
        .collect();
    Ok(rows)
}

impl FusionEngine {
    /// Fuse two registered charts into a new one.
    ///
    /// Neither input is modified. On success the new record has been registered
    /// and is returned. On error nothing is registered.
    #[tracing::instrument(skip(self))]
    pub async fn fuse(&self, chart1_id: &str, chart2_id: &str) -> Result<ChartRecord, FusionError> {
        let c1 = self.chart(chart1_id)?;
        let c2 = self.chart(chart2_id)?;
        if c1.dataset_id != c2.dataset_id {
            return Err(FusionError::CrossDatasetMismatch {
                left: c1.dataset_id.clone(),
                right: c2.dataset_id.clone(),
            });
        }
        let dataset = self.dataset(&c1.dataset_id)?;

        let (plan, agg) = FusionPlan::select(&c1, &c2, self.config().default_agg)?;
        let kind = plan.kind();
        debug!("Fusing {chart1_id} and {chart2_id} as {kind} with {agg}");

        let fused = plan.realize(&dataset.table, agg).await?;
        let mut record = ChartRecord::new(&c1.dataset_id, fused.dimensions, fused.measures)
            .with_agg(agg)
            .with_title(fused.title)
            .with_table(fused.rows);
        record.strategy = Some(kind.into());

        self.charts().put(record.clone());
        Ok(record)
    }
}
