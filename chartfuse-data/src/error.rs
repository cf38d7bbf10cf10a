use arrow::error::ArrowError;
use datafusion::error::DataFusionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Internal error: `{0}`")]
    InternalError(String),

    #[error("Column not found: `{column}`. Available columns: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("At least one measure is required for non-count aggregations")]
    MissingMeasure,

    #[error("IO error: `{0}`")]
    IoError(#[from] std::io::Error),

    #[error("DataFusion error: `{0}`")]
    DataFusionError(#[from] DataFusionError),

    #[error("Arrow error: `{0}`")]
    ArrowError(#[from] ArrowError),
}

