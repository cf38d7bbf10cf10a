//! CSV ingestion: header row required, column types inferred by Arrow

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;

use crate::error::DataError;
use crate::table::ArrowTable;

/// Read a CSV file into a table
pub fn read_csv_path(csv_path: impl AsRef<Path>) -> Result<ArrowTable, DataError> {
    let file = File::open(csv_path)?;
    read_csv(file)
}

/// Read CSV content that is already in memory, e.g. an uploaded file body
pub fn read_csv_bytes(bytes: &[u8]) -> Result<ArrowTable, DataError> {
    read_csv(Cursor::new(bytes))
}

fn read_csv<R: Read + Seek>(mut input: R) -> Result<ArrowTable, DataError> {
    let (schema, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut input, None)?;
    input.rewind()?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .build(input)?;
    let mut batches = vec![];
    for batch in reader {
        batches.push(batch?);
    }
    ArrowTable::try_new(schema, batches)
}
