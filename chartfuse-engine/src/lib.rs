pub mod charts;
pub mod config;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod registry;
pub mod shape;

pub use charts::ChartTableView;
pub use config::EngineConfig;
pub use engine::FusionEngine;
pub use error::FusionError;
pub use fusion::{FusedChart, FusionPlan};
pub use registry::{ChartRegistry, InMemoryChartRegistry};
