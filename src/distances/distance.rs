use crate::core::float::ForelFloat;
use ndarray::ArrayView1;
use ndarray_stats::errors::MultiInputError;
use ndarray_stats::DeviationExt;

/// Trait defining the interface for distance metrics between feature vectors.
pub trait DistanceMetric<F: ForelFloat>: Send + Sync {
    /// Computes the distance between two points.
    ///
    /// Fails when the points have different dimensions or are empty.
    fn compute(&self, point1: &ArrayView1<F>, point2: &ArrayView1<F>)
        -> Result<F, MultiInputError>;
}

/// [Euclidean Distance](https://en.wikipedia.org/wiki/Euclidean_distance)
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl<F: ForelFloat> DistanceMetric<F> for EuclideanDistance {
    #[inline]
    fn compute(
        &self,
        point1: &ArrayView1<F>,
        point2: &ArrayView1<F>,
    ) -> Result<F, MultiInputError> {
        point1.sq_l2_dist(point2).map(|d| d.sqrt())
    }
}

/// [Squared Euclidean Distance](https://en.wikipedia.org/wiki/Euclidean_distance)
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclideanDistance;

impl<F: ForelFloat> DistanceMetric<F> for SquaredEuclideanDistance {
    #[inline]
    fn compute(
        &self,
        point1: &ArrayView1<F>,
        point2: &ArrayView1<F>,
    ) -> Result<F, MultiInputError> {
        point1.sq_l2_dist(point2)
    }
}

#[cfg(test)]
mod tests {
    use crate::distances::{DistanceMetric, EuclideanDistance, SquaredEuclideanDistance};
    use ndarray::{array, Array1};

    #[test]
    fn test_euclidean_distance() {
        let point1 = array![1.0, 2.0, 3.0];
        let point2 = array![4.0, 5.0, 6.0];

        let result = EuclideanDistance.compute(&point1.view(), &point2.view()).unwrap();
        let expected = 27.0_f64.sqrt();

        assert!((result - expected).abs() < 1e-9, "Expected {}, got {}", expected, result);
    }

    #[test]
    fn test_squared_euclidean_distance() {
        let point1 = array![1.0, 2.0, 3.0];
        let point2 = array![4.0, 5.0, 6.0];

        let result: f64 = SquaredEuclideanDistance
            .compute(&point1.view(), &point2.view())
            .unwrap();

        assert!((result - 27.0).abs() < 1e-9, "Expected 27, got {}", result);
    }

    #[test]
    fn test_zero_distance() {
        let point = array![1.5, -2.0, 3.25];
        let result = EuclideanDistance.compute(&point.view(), &point.view()).unwrap();
        assert_eq!(result, 0.0);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let point1 = array![1.0, 2.0];
        let point2 = array![1.0, 2.0, 3.0];
        assert!(EuclideanDistance.compute(&point1.view(), &point2.view()).is_err());

        let empty: Array1<f64> = Array1::zeros(0);
        assert!(EuclideanDistance.compute(&empty.view(), &empty.view()).is_err());
    }
}
