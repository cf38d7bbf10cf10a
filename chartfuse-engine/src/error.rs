use chartfuse_data::error::DataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FusionError {
    #[error("Internal error: `{0}`")]
    InternalError(String),

    #[error("Chart not found: `{0}`")]
    ChartNotFound(String),

    #[error("Dataset not found: `{0}`")]
    DatasetNotFound(String),

    #[error("Charts must come from the same dataset: `{left}` and `{right}`")]
    CrossDatasetMismatch { left: String, right: String },

    #[error(
        "Fusion not allowed: charts must share either a dimension (and differ in measures) \
         or share a single common measure (and differ in dimensions)"
    )]
    UnsupportedShape,

    #[error("Column not found: `{column}`. Available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Fusion failed: no common dimension found")]
    NoCommonDimension,

    #[error("Data error: `{0}`")]
    DataError(DataError),
}

impl FusionError {
    /// True when a chart or dataset identifier did not resolve
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ChartNotFound(_) | Self::DatasetNotFound(_))
    }
}

impl From<DataError> for FusionError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::ColumnNotFound { column, available } => {
                Self::MissingColumn { column, available }
            }
            err => Self::DataError(err),
        }
    }
}
