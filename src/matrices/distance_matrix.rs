use crate::core::float::ForelFloat;
use crate::dataset::Dataset;
use crate::error::{ForelError, ForelResult};
use log::info;
use ndarray::{Array2, ArrayView2};

/// Symmetric N×N matrix of Euclidean distances between records.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix<F: ForelFloat> {
    data: Array2<F>,
}

impl<F: ForelFloat> DistanceMatrix<F> {
    /// Computes all pairwise distances through the dataset's feature space.
    ///
    /// Only the upper triangle is computed; the lower one is mirrored so the
    /// matrix is exactly symmetric with a zero diagonal.
    pub fn build(dataset: &Dataset<F>) -> ForelResult<Self> {
        let n = dataset.len();
        let space = dataset.space();
        let mut data = Array2::<F>::zeros((n, n));

        for i in 0..n {
            let a = dataset.record(i);
            for j in (i + 1)..n {
                let d = space.distance(&a, &dataset.record(j))?;
                data[[i, j]] = d;
                data[[j, i]] = d;
            }
        }

        info!(
            "Built {}x{} distance matrix over {} features",
            n,
            n,
            space.dimension()
        );
        Ok(Self { data })
    }

    /// Wraps a precomputed square dissimilarity matrix.
    ///
    /// Entries are taken as given: symmetry, a zero diagonal and finiteness
    /// are not checked.
    pub fn from_array(data: Array2<F>) -> ForelResult<Self> {
        if data.nrows() != data.ncols() {
            return Err(ForelError::Configuration(format!(
                "distance matrix must be square, got {}x{}",
                data.nrows(),
                data.ncols()
            )));
        }
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
