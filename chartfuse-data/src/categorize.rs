use std::collections::HashSet;

use arrow::array::Array;
use datafusion_common::ScalarValue;
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::table::ArrowTable;

/// Thresholds for treating low-cardinality integer columns (years, months, codes) as dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategorizeConfig {
    /// Distinct values / non-null values must be below this
    pub max_unique_ratio: f64,
    /// Distinct values must be below this
    pub max_unique_count: usize,
}

impl Default for CategorizeConfig {
    fn default() -> Self {
        Self {
            max_unique_ratio: 0.1,
            max_unique_count: 20,
        }
    }
}

/// Split of a dataset's columns into grouping and aggregatable columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCategories {
    pub dimensions: Vec<String>,
    pub measures: Vec<String>,
}

/// Non-numeric columns are dimensions. Numeric columns are measures unless they are
/// integers with few distinct values.
pub fn categorize_columns(
    table: &ArrowTable,
    config: &CategorizeConfig,
) -> Result<ColumnCategories, DataError> {
    let mut categories = ColumnCategories::default();
    for field in table.schema.fields() {
        let name = field.name().clone();
        let data_type = field.data_type();
        if !data_type.is_numeric() {
            categories.dimensions.push(name);
            continue;
        }

        if data_type.is_integer() && is_low_cardinality(table, &name, config)? {
            categories.dimensions.push(name);
        } else {
            categories.measures.push(name);
        }
    }
    Ok(categories)
}

fn is_low_cardinality(
    table: &ArrowTable,
    column: &str,
    config: &CategorizeConfig,
) -> Result<bool, DataError> {
    let array = table.column(column)?;
    let non_null = array.len() - array.null_count();
    if non_null == 0 {
        return Ok(false);
    }

    let mut distinct = HashSet::new();
    for i in 0..array.len() {
        if array.is_valid(i) {
            distinct.insert(ScalarValue::try_from_array(array.as_ref(), i)?);
        }
    }

    let ratio = distinct.len() as f64 / non_null as f64;
    Ok(ratio < config.max_unique_ratio && distinct.len() < config.max_unique_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, RecordBatch, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};

    #[test]
    fn test_categorize_columns() {
        let n = 100;
        let schema = Arc::new(Schema::new(vec![
            Field::new("Name", DataType::Utf8, false),
            Field::new("Year", DataType::Int64, false),
            Field::new("Units", DataType::Int64, false),
            Field::new("Price", DataType::Float64, false),
        ]));
        let names: Vec<String> = (0..n).map(|i| format!("item{i}")).collect();
        let years: Vec<i64> = (0..n).map(|i| 2020 + (i % 3)).collect();
        let units: Vec<i64> = (0..n).collect();
        let prices: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(names)),
                Arc::new(Int64Array::from(years)),
                Arc::new(Int64Array::from(units)),
                Arc::new(Float64Array::from(prices)),
            ],
        )
        .unwrap();
        let table = ArrowTable::from_batch(batch).unwrap();

        let categories = categorize_columns(&table, &CategorizeConfig::default()).unwrap();
        assert_eq!(categories.dimensions, vec!["Name", "Year"]);
        // Low-cardinality floats stay measures
        assert_eq!(categories.measures, vec!["Units", "Price"]);
    }
}
