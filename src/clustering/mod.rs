pub mod config;
pub mod forel;
pub mod metric;
pub mod salience;
pub mod sweep;
mod utils;

pub use config::Config;
pub use forel::{Cluster, Forel, Partition, SeedPolicy};
pub use metric::Metric;
pub use salience::FieldScore;
pub use sweep::{RadiusSweep, SweepParams, SweepReport, TrialResult};
