use ndarray::{Array1, ArrayView2, Axis};
use crate::core::float::ForelFloat;

/// Population variance of every column over the rows in `indices`.
pub fn population_variance<F: ForelFloat>(data: &ArrayView2<F>, indices: &[usize]) -> Array1<F> {
    if indices.is_empty() {
        return Array1::<F>::zeros(data.ncols());
    }
    let selected_data = data.select(Axis(0), indices);
    selected_data.var_axis(Axis(0), F::zero())
}
