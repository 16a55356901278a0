//! Pairwise matrices computed once per dataset and shared read-only by every
//! clustering run.

pub mod density;
pub mod distance_matrix;

pub use density::DensityMatrix;
pub use distance_matrix::DistanceMatrix;
