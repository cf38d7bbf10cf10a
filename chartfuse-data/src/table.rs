use std::sync::Arc;

use arrow::array::{Array, ArrayRef, RecordBatch};
use arrow::compute;
use arrow::datatypes::{Schema, SchemaRef};
use chartfuse_common::value::{float_cell, Row};
use datafusion::datasource::MemTable;
use datafusion::prelude::{DataFrame, SessionContext};
use datafusion_common::ScalarValue;
use serde_json::Value;

use crate::error::DataError;

/// An in-memory table: a schema plus the record batches that hold its rows
#[derive(Debug, Clone)]
pub struct ArrowTable {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl ArrowTable {
    pub fn try_new(schema: SchemaRef, partitions: Vec<RecordBatch>) -> Result<Self, DataError> {
        // Make all columns nullable so that batches with stricter fields still match
        let schema_fields: Vec<_> = schema
            .fields
            .iter()
            .map(|f| f.as_ref().clone().with_nullable(true))
            .collect();
        let schema = Arc::new(Schema::new(schema_fields));
        if partitions
            .iter()
            .all(|batch| schema.contains(batch.schema().as_ref()))
        {
            Ok(Self {
                schema,
                batches: partitions,
            })
        } else {
            Err(DataError::InternalError(
                "Mismatch between schema and batches".to_string(),
            ))
        }
    }

    pub fn from_batch(batch: RecordBatch) -> Result<Self, DataError> {
        Self::try_new(batch.schema(), vec![batch])
    }

    pub async fn from_dataframe(df: DataFrame) -> Result<Self, DataError> {
        let schema = df.schema().inner().clone();
        let partitions = df.collect().await?;
        Self::try_new(schema, partitions)
    }

    /// Expose the table to DataFusion as an unnamed in-memory scan
    pub fn to_dataframe(&self) -> Result<DataFrame, DataError> {
        let ctx = SessionContext::new();
        let provider = MemTable::try_new(self.schema.clone(), vec![self.batches.clone()])?;
        Ok(ctx.read_table(Arc::new(provider))?)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Check if the table has a column
    pub fn has_column(&self, name: &str) -> bool {
        self.schema.index_of(name).is_ok()
    }

    /// Error naming the column and listing the ones that do exist
    pub fn require_column(&self, name: &str) -> Result<(), DataError> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(DataError::ColumnNotFound {
                column: name.to_string(),
                available: self.column_names(),
            })
        }
    }

    /// Get a column from the table as a single Arrow array
    pub fn column(&self, name: &str) -> Result<ArrayRef, DataError> {
        self.require_column(name)?;
        let index = self.schema.index_of(name)?;
        let arrays = self
            .batches
            .iter()
            .map(|batch| batch.column(index).as_ref())
            .collect::<Vec<&dyn Array>>();
        if arrays.is_empty() {
            return Ok(arrow::array::new_empty_array(
                self.schema.field(index).data_type(),
            ));
        }
        Ok(compute::concat(arrays.as_slice())?)
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|batch| batch.num_rows()).sum()
    }

    /// Convert to ordered row mappings. Non-finite floats become null.
    pub fn to_rows(&self) -> Result<Vec<Row>, DataError> {
        let names = self.column_names();
        let mut rows = Vec::with_capacity(self.num_rows());
        for batch in &self.batches {
            for i in 0..batch.num_rows() {
                let mut row = Row::with_capacity(names.len());
                for (name, column) in names.iter().zip(batch.columns()) {
                    let scalar = ScalarValue::try_from_array(column.as_ref(), i)?;
                    row.insert(name.clone(), scalar_to_json(&scalar));
                }
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

/// JSON form of a single Arrow value
pub fn scalar_to_json(value: &ScalarValue) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    match value {
        ScalarValue::Boolean(Some(v)) => Value::Bool(*v),
        ScalarValue::Float32(Some(v)) => float_cell(f64::from(*v)),
        ScalarValue::Float64(Some(v)) => float_cell(*v),
        ScalarValue::Int8(Some(v)) => Value::from(*v),
        ScalarValue::Int16(Some(v)) => Value::from(*v),
        ScalarValue::Int32(Some(v)) => Value::from(*v),
        ScalarValue::Int64(Some(v)) => Value::from(*v),
        ScalarValue::UInt8(Some(v)) => Value::from(*v),
        ScalarValue::UInt16(Some(v)) => Value::from(*v),
        ScalarValue::UInt32(Some(v)) => Value::from(*v),
        ScalarValue::UInt64(Some(v)) => Value::from(*v),
        ScalarValue::Decimal128(Some(v), _, scale) => {
            float_cell(*v as f64 / 10f64.powi(i32::from(*scale)))
        }
        ScalarValue::Utf8(Some(v))
        | ScalarValue::LargeUtf8(Some(v))
        | ScalarValue::Utf8View(Some(v)) => Value::String(v.clone()),
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field};
    use serde_json::json;

    fn sample() -> ArrowTable {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Region", DataType::Utf8, false),
            Field::new("Units", DataType::Int64, false),
            Field::new("Ratio", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["East", "West"])),
                Arc::new(Int64Array::from(vec![3, 4])),
                Arc::new(Float64Array::from(vec![Some(f64::NAN), Some(0.5)])),
            ],
        )
        .unwrap();
        ArrowTable::from_batch(batch).unwrap()
    }

    #[test]
    fn test_rows_preserve_column_order_and_null_out_nan() {
        let rows = sample().to_rows().unwrap();
        assert_eq!(rows.len(), 2);
        let keys: Vec<_> = rows[0].keys().cloned().collect();
        assert_eq!(keys, vec!["Region", "Units", "Ratio"]);
        assert_eq!(rows[0]["Ratio"], Value::Null);
        assert_eq!(rows[1]["Ratio"], json!(0.5));
        assert_eq!(rows[1]["Units"], json!(4));
    }

    #[test]
    fn test_require_column_lists_available() {
        let table = sample();
        assert!(table.has_column("Units"));
        match table.require_column("Population") {
            Err(DataError::ColumnNotFound { column, available }) => {
                assert_eq!(column, "Population");
                assert_eq!(available, vec!["Region", "Units", "Ratio"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_column_concat() {
        let table = sample();
        let column = table.column("Units").unwrap();
        assert_eq!(column.len(), 2);
        assert_eq!(table.num_rows(), 2);
    }
}
