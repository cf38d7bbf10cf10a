//! Structural classification of chart records.
//!
//! A chart's shape is read off the lengths and contents of its `dimensions` and
//! `measures`. The raw predicates are exposed for callers that need them, and
//! [`ChartShape`] is the tagged result fusion dispatches on.

use std::collections::BTreeSet;

use chartfuse_common::chart::ChartRecord;
use chartfuse_common::types::{BIN_DIMENSION, COUNT_MEASURE};
use log::warn;

fn name_set(names: &[String]) -> BTreeSet<&str> {
    names.iter().map(String::as_str).collect()
}

/// Legacy unbucketed histogram (no dimensions, one real measure) or bucketed
/// histogram (`bin` / `count`)
pub fn is_measure_histogram(chart: &ChartRecord) -> bool {
    match (chart.dimensions.as_slice(), chart.measures.as_slice()) {
        ([], [measure]) => measure != COUNT_MEASURE,
        ([dimension], [measure]) => dimension == BIN_DIMENSION && measure == COUNT_MEASURE,
        _ => false,
    }
}

/// One dimension and either no measures or only the synthetic `count`
pub fn is_dimension_count(chart: &ChartRecord) -> bool {
    match (chart.dimensions.as_slice(), chart.measures.as_slice()) {
        ([_], []) => true,
        ([_], [measure]) => measure == COUNT_MEASURE,
        _ => false,
    }
}

/// Identical, non-empty grouping keys (compared in order) with different measure sets
pub fn same_dimension_different_measures(a: &ChartRecord, b: &ChartRecord) -> bool {
    !a.dimensions.is_empty()
        && a.dimensions == b.dimensions
        && name_set(&a.measures) != name_set(&b.measures)
}

/// Exactly one shared measure and different grouping keys.
///
/// Never true when either chart is a histogram, those go through the semantic merge.
pub fn same_measure_different_dimensions(a: &ChartRecord, b: &ChartRecord) -> bool {
    if is_measure_histogram(a) || is_measure_histogram(b) {
        return false;
    }
    shared_measures(a, b).len() == 1
        && a.dimensions != b.dimensions
        && (!a.dimensions.is_empty() || !b.dimensions.is_empty())
}

/// Measures present in both charts, ordered by name
pub fn shared_measures<'a>(a: &'a ChartRecord, b: &ChartRecord) -> Vec<&'a str> {
    let other = name_set(&b.measures);
    name_set(&a.measures)
        .into_iter()
        .filter(|m| other.contains(m))
        .collect()
}

/// Sorted, de-duplicated union of both charts' measures
pub fn measure_union(a: &ChartRecord, b: &ChartRecord) -> Vec<String> {
    name_set(&a.measures)
        .union(&name_set(&b.measures))
        .map(|m| m.to_string())
        .collect()
}

/// Dimensions of `a` that also appear in `b`, in `a`'s order
pub fn common_dimensions(a: &ChartRecord, b: &ChartRecord) -> Vec<String> {
    let other = name_set(&b.dimensions);
    let mut common: Vec<String> = vec![];
    for dimension in &a.dimensions {
        if other.contains(dimension.as_str()) && !common.contains(dimension) {
            common.push(dimension.clone());
        }
    }
    common
}

/// Column a histogram summarizes: `originalMeasure` when set, otherwise the
/// literal first measure (which may be the synthetic `count`)
pub fn histogram_measure(chart: &ChartRecord) -> Option<String> {
    match chart.original_measure.as_deref() {
        Some(measure) if !measure.is_empty() => Some(measure.to_string()),
        _ => {
            let fallback = chart.measures.first()?;
            warn!(
                "Chart {} has no originalMeasure, using '{}' as its measure",
                chart.chart_id, fallback
            );
            Some(fallback.clone())
        }
    }
}

/// Shape of a single chart, computed once and used for dispatch.
///
/// A bucketed histogram also satisfies [`is_dimension_count`]; it is classified
/// as a histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartShape {
    Histogram { measure: String },
    DimensionCount { dimension: String },
    Generic,
}

impl ChartShape {
    pub fn of(chart: &ChartRecord) -> Self {
        if is_measure_histogram(chart) {
            if let Some(measure) = histogram_measure(chart) {
                return Self::Histogram { measure };
            }
        }
        if is_dimension_count(chart) {
            if let Some(dimension) = chart.dimensions.first() {
                return Self::DimensionCount {
                    dimension: dimension.clone(),
                };
            }
        }
        Self::Generic
    }
}
