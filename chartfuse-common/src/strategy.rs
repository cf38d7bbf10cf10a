use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which fusion case produced a chart
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StrategyKind {
    SameDimensionDifferentMeasures,
    SameMeasureDifferentDimensionsStacked,
    SameMeasureDifferentDimensions,
    HistogramDimensionSemanticMerge,
    MeasureVsMeasure,
    DimensionVsDimension,
}

impl StrategyKind {
    /// Visual encodings that suit the fused table
    pub fn suggestion(&self) -> &'static str {
        match self {
            StrategyKind::SameDimensionDifferentMeasures => {
                "grouped-bar | stacked-bar | dual-axis-line"
            }
            StrategyKind::SameMeasureDifferentDimensionsStacked => "stacked-bar | bubble-chart",
            StrategyKind::SameMeasureDifferentDimensions => {
                "multi-series line/bar | heatmap-ready (if granular joint exists)"
            }
            StrategyKind::HistogramDimensionSemanticMerge => "bar | line | grouped-bar",
            StrategyKind::MeasureVsMeasure => "scatter | dual-histogram",
            StrategyKind::DimensionVsDimension => "heatmap | mosaic | grouped-bar",
        }
    }
}

/// Strategy descriptor attached to fused charts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionStrategy {
    #[serde(rename = "type")]
    pub kind: StrategyKind,
    pub suggestion: String,
}

impl From<StrategyKind> for FusionStrategy {
    fn from(kind: StrategyKind) -> Self {
        Self {
            kind,
            suggestion: kind.suggestion().to_string(),
        }
    }
}
