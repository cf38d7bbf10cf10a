use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

/// Reserved measure name meaning "row count". Never a real dataset column.
pub const COUNT_MEASURE: &str = "count";

/// Synthetic dimension produced by bucketing a continuous measure.
pub const BIN_DIMENSION: &str = "bin";

/// Aggregation function applied to a chart's measures
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AggOp {
    #[default]
    Sum,
    /// Arithmetic mean. Some backends call this `mean`, both spellings parse.
    #[serde(alias = "mean")]
    #[strum(to_string = "avg", serialize = "mean")]
    Avg,
    Min,
    Max,
    Count,
}

impl AggOp {
    /// Returns the first aggregation that is set, in argument order
    pub fn pick(candidates: &[Option<AggOp>]) -> Option<AggOp> {
        candidates.iter().copied().flatten().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_agg_op() {
        assert_eq!(AggOp::from_str("sum").unwrap(), AggOp::Sum);
        assert_eq!(AggOp::from_str("avg").unwrap(), AggOp::Avg);
        assert_eq!(AggOp::from_str("mean").unwrap(), AggOp::Avg);
        assert_eq!(AggOp::from_str("count").unwrap(), AggOp::Count);
        assert!(AggOp::from_str("median").is_err());
        assert_eq!(AggOp::Avg.to_string(), "avg");
    }

    #[test]
    fn test_agg_op_serde() {
        let op: AggOp = serde_json::from_str("\"mean\"").unwrap();
        assert_eq!(op, AggOp::Avg);
        assert_eq!(serde_json::to_string(&AggOp::Max).unwrap(), "\"max\"");
    }

    #[test]
    fn test_pick_is_left_to_right() {
        assert_eq!(AggOp::pick(&[None, Some(AggOp::Max), Some(AggOp::Min)]), Some(AggOp::Max));
        assert_eq!(AggOp::pick(&[Some(AggOp::Count), Some(AggOp::Min)]), Some(AggOp::Count));
        assert_eq!(AggOp::pick(&[None, None]), None);
    }
}
