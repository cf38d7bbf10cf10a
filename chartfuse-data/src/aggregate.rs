//! Grouping and aggregation over in-memory tables, expressed with the DataFusion DataFrame API

use arrow::datatypes::DataType;
use chartfuse_common::chart::ChartFilters;
use chartfuse_common::types::{AggOp, COUNT_MEASURE};
use chartfuse_common::value::Row;
use datafusion::functions::expr_fn::coalesce;
use datafusion::functions_aggregate::expr_fn::{avg, count, sum};
use datafusion::functions_aggregate::min_max::{max, min};
use datafusion::logical_expr::{cast, ident, lit, Expr};
use log::{debug, warn};

use crate::error::DataError;
use crate::table::ArrowTable;

/// Map a public aggregation name onto the backend's aggregate function
fn agg_expr(op: AggOp, expr: Expr) -> Expr {
    match op {
        AggOp::Sum => sum(expr),
        // The public name is `avg`, the operation is the arithmetic mean
        AggOp::Avg => avg(expr),
        AggOp::Min => min(expr),
        AggOp::Max => max(expr),
        AggOp::Count => count(expr),
    }
}

fn row_count() -> Expr {
    count(lit(1))
}

/// Drop repeated names, keeping first occurrences in order
fn unique_columns(columns: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        if !unique.contains(column) {
            unique.push(column.clone());
        }
    }
    unique
}

/// Group by `group_by` and evaluate `aggr_exprs` per group.
///
/// Rows with a null group key are dropped and groups come back sorted by key.
/// Output columns named in `zero_fill` have nulls replaced by `0`.
async fn grouped(
    table: &ArrowTable,
    group_by: &[String],
    aggr_exprs: Vec<Expr>,
    zero_fill: &[String],
) -> Result<ArrowTable, DataError> {
    let mut df = table.to_dataframe()?;
    for column in group_by {
        df = df.filter(ident(column).is_not_null())?;
    }

    let group_exprs = group_by.iter().map(|c| ident(c)).collect::<Vec<_>>();
    let mut df = df.aggregate(group_exprs, aggr_exprs)?;
    if !zero_fill.is_empty() {
        let projection = df
            .schema()
            .fields()
            .iter()
            .map(|field| {
                let name = field.name();
                if zero_fill.contains(name) {
                    coalesce(vec![ident(name), lit(0_i64)]).alias(name)
                } else {
                    ident(name)
                }
            })
            .collect::<Vec<_>>();
        df = df.select(projection)?;
    }
    if !group_by.is_empty() {
        df = df.sort(
            group_by
                .iter()
                .map(|column| ident(column).sort(true, false))
                .collect(),
        )?;
    }
    ArrowTable::from_dataframe(df).await
}

/// Sum over a group whose values are all null is `0`, not null
fn sum_columns(agg: AggOp, values: &[String]) -> Vec<String> {
    if agg != AggOp::Sum {
        return Vec::new();
    }
    values
        .iter()
        .filter(|v| v.as_str() != COUNT_MEASURE)
        .cloned()
        .collect()
}

/// Aggregate `values` grouped by `group_by`.
///
/// - `count` ignores `values` and yields one `count` column per group (or a single
///   total row without groups).
/// - Other ops need at least one value column and apply the op to each value column
///   independently. The reserved `count` measure is realized as a row count and is
///   never looked up in the table.
#[tracing::instrument(skip(table))]
pub async fn aggregate(
    table: &ArrowTable,
    group_by: &[String],
    values: &[String],
    agg: AggOp,
) -> Result<ArrowTable, DataError> {
    let group_by = unique_columns(group_by);
    for column in &group_by {
        table.require_column(column)?;
    }

    let values = unique_columns(values);
    let aggr_exprs = if agg == AggOp::Count {
        vec![row_count().alias(COUNT_MEASURE)]
    } else {
        if values.is_empty() {
            return Err(DataError::MissingMeasure);
        }
        let mut exprs = Vec::with_capacity(values.len());
        for value in values.iter().cloned() {
            if value == COUNT_MEASURE {
                exprs.push(row_count().alias(COUNT_MEASURE));
            } else {
                table.require_column(&value)?;
                exprs.push(agg_expr(agg, ident(&value)).alias(&value));
            }
        }
        exprs
    };

    debug!(
        "aggregate {} over {} rows, group_by={:?}, values={:?}",
        agg,
        table.num_rows(),
        group_by,
        values
    );
    grouped(table, &group_by, aggr_exprs, &sum_columns(agg, &values)).await
}

/// Aggregate a single measure per group, keeping the measure's name for the output column.
///
/// Unlike [`aggregate`], `count` here counts the measure's non-null values.
pub async fn aggregate_measure(
    table: &ArrowTable,
    group_by: &[String],
    measure: &str,
    agg: AggOp,
) -> Result<ArrowTable, DataError> {
    let group_by = unique_columns(group_by);
    for column in &group_by {
        table.require_column(column)?;
    }

    let expr = if measure == COUNT_MEASURE {
        row_count().alias(COUNT_MEASURE)
    } else {
        table.require_column(measure)?;
        agg_expr(agg, ident(measure)).alias(measure)
    };
    let zero_fill = sum_columns(agg, &[measure.to_string()]);
    grouped(table, &group_by, vec![expr], &zero_fill).await
}

/// Frequency of each distinct combination of `group_by`, in a column named `output`
pub async fn grouped_count(
    table: &ArrowTable,
    group_by: &[String],
    output: &str,
) -> Result<ArrowTable, DataError> {
    let group_by = unique_columns(group_by);
    for column in &group_by {
        table.require_column(column)?;
    }
    grouped(table, &group_by, vec![row_count().alias(output)], &[]).await
}

/// Row-level values of `columns`, dropping every row where any of them is missing.
///
/// NaN counts as missing.
pub async fn project_non_null(
    table: &ArrowTable,
    columns: &[String],
) -> Result<Vec<Row>, DataError> {
    let columns = unique_columns(columns);
    for column in &columns {
        table.require_column(column)?;
    }

    let mut df = table.to_dataframe()?;
    for column in &columns {
        df = df.filter(ident(column).is_not_null())?;
    }
    let df = df.select(columns.iter().map(|c| ident(c)).collect::<Vec<_>>())?;

    let mut rows = ArrowTable::from_dataframe(df).await?.to_rows()?;
    rows.retain(|row| columns.iter().all(|c| row.get(c).is_some_and(|v| !v.is_null())));
    Ok(rows)
}

/// Keep rows whose value for every filtered dimension is one of its allowed values.
///
/// Values are compared as strings. Empty value lists are ignored and dimensions that
/// are not in the table are skipped.
pub async fn apply_filters(
    table: &ArrowTable,
    filters: &ChartFilters,
) -> Result<ArrowTable, DataError> {
    let mut predicate: Option<Expr> = None;
    for (dimension, allowed) in filters {
        if allowed.is_empty() {
            continue;
        }
        if !table.has_column(dimension) {
            warn!("Filter dimension '{dimension}' not found in dataset, skipping");
            continue;
        }
        let candidates = allowed.iter().map(|v| lit(v.as_str())).collect::<Vec<_>>();
        let expr = cast(ident(dimension), DataType::Utf8).in_list(candidates, false);
        predicate = Some(match predicate {
            Some(acc) => acc.and(expr),
            None => expr,
        });
    }

    let Some(predicate) = predicate else {
        return Ok(table.clone());
    };

    let df = table.to_dataframe()?.filter(predicate)?;
    let filtered = ArrowTable::from_dataframe(df).await?;
    debug!(
        "filters kept {} of {} rows",
        filtered.num_rows(),
        table.num_rows()
    );
    Ok(filtered)
}
