use crate::core::float::ForelFloat;
use crate::error::{ForelError, ForelResult};
use crate::matrices::{DensityMatrix, DistanceMatrix};

/// The distance used for radius comparisons, read from precomputed matrices.
///
/// Either raw Euclidean distance, or distance weighted by the squared density
/// ratio `d(i, j) * tau(i, j)^2`.
#[derive(Debug, Clone, Copy)]
pub enum Metric<'a, F: ForelFloat> {
    Euclidean(&'a DistanceMatrix<F>),
    DensityWeighted {
        distances: &'a DistanceMatrix<F>,
        density: &'a DensityMatrix<F>,
    },
}

impl<'a, F: ForelFloat> Metric<'a, F> {
    /// Picks the metric for `use_density_weighting`; the density matrix is
    /// required only when weighting is on.
    pub fn select(
        distances: &'a DistanceMatrix<F>,
        density: Option<&'a DensityMatrix<F>>,
        use_density_weighting: bool,
    ) -> ForelResult<Self> {
        if !use_density_weighting {
            return Ok(Metric::Euclidean(distances));
        }
        let density = density.ok_or_else(|| {
            ForelError::Configuration(
                "density weighting requested without a density matrix".to_string(),
            )
        })?;
        if density.len() != distances.len() {
            return Err(ForelError::Configuration(format!(
                "density matrix is {}x{} but distance matrix is {}x{}",
                density.len(),
                density.len(),
                distances.len(),
                distances.len()
            )));
        }
        Ok(Metric::DensityWeighted { distances, density })
    }

    pub fn is_density_weighted(&self) -> bool {
        matches!(self, Metric::DensityWeighted { .. })
    }

    /// Number of records the metric is defined over.
    pub fn len(&self) -> usize {
        match self {
            Metric::Euclidean(distances) => distances.len(),
            Metric::DensityWeighted { distances, .. } => distances.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> F {
        match self {
            Metric::Euclidean(distances) => distances.get(i, j),
            Metric::DensityWeighted { distances, density } => {
                let t = density.get(i, j);
                distances.get(i, j) * t * t
            }
        }
    }

    /// Maximum metric distance over all unordered pairs.
    pub fn diameter(&self) -> F {
        let n = self.len();
        let mut max = F::zero();
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.distance(i, j);
                if d > max {
                    max = d;
                }
            }
        }
        max
    }
}
