//! Per-cluster feature salience: which fields the members agree on most.

use crate::clustering::utils::population_variance;
use crate::core::float::ForelFloat;
use crate::dataset::Dataset;
use serde::Serialize;
use std::cmp::Ordering;

/// Number of fields reported per cluster.
pub const TOP_FIELDS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldScore<F: ForelFloat> {
    pub field: String,
    pub score: F,
}

/// Ranks the feature fields by how tightly `members` concentrate on them.
///
/// Each field's population variance is normalized by the largest one and
/// scored `log10(1 / normalized)`, so the widest-spread field scores 0 and
/// tighter fields score higher. Constant fields are left out. Scores are
/// sorted descending; tied fields come out last field first, which decides
/// who survives the [`TOP_FIELDS`] cut.
pub fn rank<F: ForelFloat>(dataset: &Dataset<F>, members: &[usize]) -> Vec<FieldScore<F>> {
    let variance = population_variance(&dataset.values(), members);
    let max = variance.iter().fold(F::zero(), |max, &v| max.max(v));
    if max <= F::zero() {
        return Vec::new();
    }

    let fields = dataset.fields();
    let mut scores: Vec<FieldScore<F>> = (0..fields.len())
        .rev()
        .filter(|&col| variance[col] > F::zero())
        .map(|col| FieldScore {
            field: fields[col].clone(),
            score: (F::one() / (variance[col] / max)).log10(),
        })
        .collect();

    scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scores.truncate(TOP_FIELDS);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_constant_field_excluded_and_tight_field_first() {
        // wide: variance 100, tight: variance 1, constant: variance 0
        let dataset: Dataset<f64> = Dataset::from_unnamed(
            &["wide", "constant", "tight"],
            array![[-10.0, 3.0, 4.0], [10.0, 3.0, 6.0]],
        )
        .unwrap();

        let ranking = rank(&dataset, &[0, 1]);
        let fields: Vec<&str> = ranking.iter().map(|s| s.field.as_str()).collect();
        assert_eq!(fields, vec!["tight", "wide"]);
        assert!((ranking[0].score - 2.0).abs() < 1e-12);
        assert_eq!(ranking[1].score, 0.0);
    }

    #[test]
    fn test_ties_come_out_last_field_first() {
        let dataset =
            Dataset::from_unnamed(&["a", "b", "c"], array![[0.0, 0.0, 0.0], [1.0, 1.0, 4.0]])
                .unwrap();
        let ranking = rank(&dataset, &[0, 1]);
        let fields: Vec<&str> = ranking.iter().map(|s| s.field.as_str()).collect();
        assert_eq!(fields, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_cut_keeps_later_tied_fields() {
        // 22 fields with identical spread plus one wide field.
        let mut fields: Vec<String> = (1..=22).map(|i| format!("f{}", i)).collect();
        fields.push("wide".to_string());
        let mut values = Array2::<f64>::zeros((2, 23));
        values.row_mut(1).fill(1.0);
        values[[1, 22]] = 10.0;
        let dataset = Dataset::from_unnamed(&fields, values).unwrap();

        let ranking = rank(&dataset, &[0, 1]);
        assert_eq!(ranking.len(), TOP_FIELDS);
        assert_eq!(ranking[0].field, "f22");
        assert_eq!(ranking[19].field, "f3");
        assert!(ranking.iter().all(|s| s.field != "f1" && s.field != "wide"));
    }

    #[test]
    fn test_only_members_are_considered() {
        let dataset =
            Dataset::from_unnamed(&["x", "y"], array![[0.0, 1.0], [0.0, 2.0], [50.0, 9.0]])
                .unwrap();
        let ranking = rank(&dataset, &[0, 1]);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].field, "y");
    }

    #[test]
    fn test_truncated_to_top_fields() {
        let fields: Vec<String> = (0..30).map(|i| format!("f{}", i)).collect();
        let values = Array2::from_shape_fn((2, 30), |(r, c)| (r * (c + 1)) as f64);
        let dataset = Dataset::from_unnamed(&fields, values).unwrap();

        let ranking = rank(&dataset, &[0, 1]);
        assert_eq!(ranking.len(), TOP_FIELDS);
        // Smallest spread first.
        assert_eq!(ranking[0].field, "f0");
        assert!(ranking.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_singleton_has_no_ranking() {
        let dataset = Dataset::from_unnamed(&["x"], array![[1.0], [2.0]]).unwrap();
        assert!(rank(&dataset, &[1]).is_empty());
    }
}
