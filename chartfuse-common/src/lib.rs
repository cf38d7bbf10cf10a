pub mod chart;
pub mod strategy;
pub mod title;
pub mod types;
pub mod value;
