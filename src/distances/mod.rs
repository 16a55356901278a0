pub mod distance;
pub mod feature_space;

pub use distance::{DistanceMetric, EuclideanDistance, SquaredEuclideanDistance};
pub use feature_space::{FeatureSpace, FieldSelector};
