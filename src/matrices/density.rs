use crate::core::float::ForelFloat;
use crate::error::{ForelError, ForelResult};
use crate::matrices::DistanceMatrix;
use log::{debug, info};
use ndarray::{Array2, ArrayView2};

/// Normalized local-density ("tau") matrix.
///
/// `tau(i, j)` relates the edge `i–j` to the shortest edge from either
/// endpoint to any third point, scaled so every entry lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMatrix<F: ForelFloat> {
    data: Array2<F>,
}

impl<F: ForelFloat> DensityMatrix<F> {
    /// Smallest dataset a third point can be found for.
    pub const MIN_RECORDS: usize = 3;

    pub fn build(distances: &DistanceMatrix<F>) -> ForelResult<Self> {
        let n = distances.len();
        if n < Self::MIN_RECORDS {
            return Err(ForelError::InsufficientData {
                required: Self::MIN_RECORDS,
                actual: n,
            });
        }

        // Ratios with a zero-length adjacent edge are unbounded; they are kept
        // as infinity here and saturate to 1 after normalization.
        let mut data = Array2::<F>::zeros((n, n));
        let mut max_tau = F::zero();
        let mut saturated = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                let d = distances.get(i, j);
                let beta = min_adjacent_edge(distances, i, j);
                let tau = if d == F::zero() {
                    F::zero()
                } else if beta == F::zero() {
                    saturated += 1;
                    F::infinity()
                } else {
                    d / beta
                };
                if tau.is_finite() && tau > max_tau {
                    max_tau = tau;
                }
                data[[i, j]] = tau;
                data[[j, i]] = tau;
            }
        }

        data.mapv_inplace(|tau| {
            if tau.is_infinite() {
                F::one()
            } else if max_tau > F::zero() {
                tau / max_tau
            } else {
                F::zero()
            }
        });

        if saturated > 0 {
            debug!("{} density entries saturated by duplicate points", saturated);
        }
        info!("Built {}x{} density matrix (max tau {})", n, n, max_tau);
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> F {
        self.data[[i, j]]
    }

    pub fn view(&self) -> ArrayView2<'_, F> {
        self.data.view()
    }
}

/// Length of the shortest edge from `a` or `b` to any point other than `a` and `b`.
fn min_adjacent_edge<F: ForelFloat>(distances: &DistanceMatrix<F>, a: usize, b: usize) -> F {
    (0..distances.len())
        .filter(|&k| k != a && k != b)
        .fold(F::infinity(), |min, k| {
            min.min(distances.get(a, k)).min(distances.get(b, k))
        })
}
