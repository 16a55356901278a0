/// forel: FOREL radius clustering in Rust
///
/// Records are clustered around real data points: each cluster's center moves
/// to the member of its radius ball with the smallest summed distance to the
/// rest until it is stable. A sweep mode reruns the clustering over a range
/// of radii and scores each run.
///
/// # Modules
/// - `dataset`: Loading delimited files into feature matrices.
/// - `distances`: Feature selection and Euclidean distance.
/// - `matrices`: Pairwise distance and local-density matrices.
/// - `clustering`: The FOREL engine, salience ranking, radius sweep and configuration.
/// - `report`: Line output of partitions and sweep trials.
pub mod clustering;
pub mod core;
pub mod dataset;
pub mod distances;
pub mod error;
pub mod matrices;
pub mod report;

pub use error::{ForelError, ForelResult};
