//! Single-column summaries used to build histograms and dimension count charts

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use chartfuse_common::value::cell_label;
use datafusion::functions_aggregate::expr_fn::count;
use datafusion::logical_expr::{ident, lit};
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::table::ArrowTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureStats {
    pub sum: f64,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: usize,
}

/// Raw values of a measure plus summary statistics. Binning is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSummary {
    pub measure: String,
    pub values: Vec<f64>,
    pub stats: MeasureStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionCounts {
    pub dimension: String,
    pub labels: Vec<String>,
    pub counts: Vec<i64>,
    pub total: i64,
}

/// Numeric values of `measure`. Values that do not parse as numbers are dropped.
pub fn histogram(table: &ArrowTable, measure: &str) -> Result<HistogramSummary, DataError> {
    let column = cast(&table.column(measure)?, &DataType::Float64)?;
    let values: Vec<f64> = column
        .as_primitive::<Float64Type>()
        .iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();

    let count = values.len();
    let sum: f64 = values.iter().sum();
    let stats = MeasureStats {
        sum,
        avg: (count > 0).then(|| sum / count as f64),
        min: values.iter().copied().reduce(f64::min),
        max: values.iter().copied().reduce(f64::max),
        count,
    };

    Ok(HistogramSummary {
        measure: measure.to_string(),
        values,
        stats,
    })
}

/// Occurrences of each non-null value of `dimension`, most frequent first
pub async fn dimension_counts(
    table: &ArrowTable,
    dimension: &str,
) -> Result<DimensionCounts, DataError> {
    table.require_column(dimension)?;

    let df = table
        .to_dataframe()?
        .filter(ident(dimension).is_not_null())?
        .aggregate(vec![ident(dimension)], vec![count(lit(1)).alias("count")])?
        .sort(vec![
            ident("count").sort(false, false),
            ident(dimension).sort(true, false),
        ])?;
    let counted = ArrowTable::from_dataframe(df).await?;

    let labels = counted
        .to_rows()?
        .iter()
        .map(|row| row.get(dimension).map(cell_label).unwrap_or_default())
        .collect::<Vec<_>>();
    let counts_array = cast(&counted.column("count")?, &DataType::Int64)?;
    let counts: Vec<i64> = counts_array
        .as_primitive::<Int64Type>()
        .iter()
        .map(|v| v.unwrap_or(0))
        .collect();
    let total = counts.iter().sum();

    Ok(DimensionCounts {
        dimension: dimension.to_string(),
        labels,
        counts,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::read_csv_bytes;

    #[test]
    fn test_histogram_drops_missing_values() {
        let table = read_csv_bytes(b"Age,Name\n30,a\n,b\n50,c\n").unwrap();
        let summary = histogram(&table, "Age").unwrap();
        assert_eq!(summary.values, vec![30.0, 50.0]);
        assert_eq!(summary.stats.count, 2);
        assert_eq!(summary.stats.sum, 80.0);
        assert_eq!(summary.stats.avg, Some(40.0));
        assert_eq!(summary.stats.min, Some(30.0));
        assert_eq!(summary.stats.max, Some(50.0));
    }

    #[test]
    fn test_histogram_of_text_column_is_empty() {
        let table = read_csv_bytes(b"Age,Name\n30,a\n40,b\n").unwrap();
        let summary = histogram(&table, "Name").unwrap();
        assert!(summary.values.is_empty());
        assert_eq!(summary.stats.avg, None);
    }

    #[tokio::test]
    async fn test_dimension_counts_most_frequent_first() {
        let table =
            read_csv_bytes(b"Region,Sales\nEast,1\nWest,2\nEast,3\nNorth,4\nEast,5\nWest,6\n")
                .unwrap();
        let counts = dimension_counts(&table, "Region").await.unwrap();
        assert_eq!(counts.labels, vec!["East", "West", "North"]);
        assert_eq!(counts.counts, vec![3, 2, 1]);
        assert_eq!(counts.total, 6);
    }
}
