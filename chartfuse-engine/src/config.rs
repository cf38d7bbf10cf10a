use chartfuse_common::types::AggOp;
use chartfuse_data::categorize::CategorizeConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Aggregation used by fusion when neither input chart names one
    pub default_agg: AggOp,
    /// Thresholds used to split a newly added dataset's columns
    pub categorize: CategorizeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_agg: AggOp::Sum,
            categorize: CategorizeConfig::default(),
        }
    }
}
