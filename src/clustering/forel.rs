use crate::clustering::metric::Metric;
use crate::clustering::salience::{self, FieldScore};
use crate::core::float::ForelFloat;
use crate::dataset::Dataset;
use crate::error::{ForelError, ForelResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// How the first record of each center search is chosen.
///
/// The very first search starts at `first_index`; every later one starts at
/// the lowest-indexed unclustered record. Nothing is random, so repeated runs
/// on the same data give the same partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Falls back to the lowest unclustered record when `None` or out of range.
    pub first_index: Option<usize>,
}

impl SeedPolicy {
    pub const DEFAULT_FIRST_INDEX: usize = 9;

    pub fn fixed(first_index: usize) -> Self {
        Self {
            first_index: Some(first_index),
        }
    }

    pub fn lowest_unclustered() -> Self {
        Self { first_index: None }
    }
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self::fixed(Self::DEFAULT_FIRST_INDEX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster<F: ForelFloat> {
    pub id: usize,
    /// Index of the record the center search settled on.
    pub center_idx: usize,
    /// Member record indices, ascending.
    pub points: Vec<usize>,
    /// Sum of metric distances from the center to every member.
    pub weight: F,
    /// Feature ranking; only computed for multi-member clusters when requested.
    pub salience: Option<Vec<FieldScore<F>>>,
}

impl<F: ForelFloat> Cluster<F> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Result of one clustering run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition<F: ForelFloat> {
    pub radius: F,
    /// Cluster id of every record, in dataset order. Ids start at 1.
    pub labels: Vec<usize>,
    /// Clusters in commit order; `clusters[k].id == k + 1`.
    pub clusters: Vec<Cluster<F>>,
    pub total_weight: F,
}

impl<F: ForelFloat> Partition<F> {
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn cluster_of(&self, record: usize) -> Option<usize> {
        self.labels.get(record).copied()
    }

    pub fn cluster(&self, id: usize) -> Option<&Cluster<F>> {
        id.checked_sub(1).and_then(|k| self.clusters.get(k))
    }
}

/// Clustering annotations owned by a single run.
struct RunState {
    labels: Vec<Option<usize>>,
    unassigned: usize,
}

impl RunState {
    fn new(n: usize) -> Self {
        Self {
            labels: vec![None; n],
            unassigned: n,
        }
    }

    #[inline]
    fn is_clustered(&self, idx: usize) -> bool {
        self.labels[idx].is_some()
    }

    fn first_unclustered(&self) -> Option<usize> {
        self.labels.iter().position(|l| l.is_none())
    }

    fn commit(&mut self, points: &[usize], cluster_id: usize) {
        for &p in points {
            self.labels[p] = Some(cluster_id);
        }
        self.unassigned -= points.len();
    }
}

/// FOREL clustering over a precomputed [`Metric`].
///
/// Each cluster is grown from a seed record: the center moves to the member
/// of its radius ball with the smallest summed distance to the other members
/// until it stops moving, and the final ball becomes the cluster.
pub struct Forel<'a, F: ForelFloat> {
    metric: Metric<'a, F>,
    seed: SeedPolicy,
    salience_source: Option<&'a Dataset<F>>,
}

impl<'a, F: ForelFloat> Forel<'a, F> {
    pub fn new(metric: Metric<'a, F>) -> Self {
        Self {
            metric,
            seed: SeedPolicy::default(),
            salience_source: None,
        }
    }

    pub fn with_seed(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }

    /// Ranks feature salience for every multi-member cluster using `dataset`.
    pub fn with_salience(mut self, dataset: &'a Dataset<F>) -> Self {
        self.salience_source = Some(dataset);
        self
    }

    /// Drops the dataset set by [`Forel::with_salience`].
    pub fn without_salience(mut self) -> Self {
        self.salience_source = None;
        self
    }

    pub fn ranks_salience(&self) -> bool {
        self.salience_source.is_some()
    }

    pub fn metric(&self) -> &Metric<'a, F> {
        &self.metric
    }

    /// Partitions the dataset into clusters of the given radius.
    pub fn run(&self, radius: F) -> ForelResult<Partition<F>> {
        if radius.is_nan() || radius < F::zero() {
            return Err(ForelError::Configuration(format!(
                "radius must be a non-negative number, got {}",
                radius
            )));
        }
        let n = self.metric.len();
        if n == 0 {
            return Err(ForelError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        if let Some(dataset) = self.salience_source {
            if dataset.len() != n {
                return Err(ForelError::Configuration(format!(
                    "salience dataset has {} records, metric has {}",
                    dataset.len(),
                    n
                )));
            }
        }

        let mut state = RunState::new(n);
        let mut clusters: Vec<Cluster<F>> = Vec::new();
        let mut total_weight = F::zero();

        while state.unassigned > 0 {
            let Some(seed) = self.next_seed(&state, clusters.is_empty()) else {
                break;
            };
            let (center_idx, points) = self.seek_center(&state, seed, radius)?;

            let id = clusters.len() + 1;
            state.commit(&points, id);
            let weight = self.cluster_weight(center_idx, &points);
            total_weight += weight;
            debug!(
                "Cluster {}: center {}, {} points, weight {}",
                id,
                center_idx,
                points.len(),
                weight
            );

            let salience = match self.salience_source {
                Some(dataset) if points.len() > 1 => Some(salience::rank(dataset, &points)),
                _ => None,
            };
            clusters.push(Cluster {
                id,
                center_idx,
                points,
                weight,
                salience,
            });
        }

        debug!(
            "FOREL at radius {}: {} clusters, total weight {}",
            radius,
            clusters.len(),
            total_weight
        );
        Ok(Partition {
            radius,
            labels: state.labels.into_iter().map(|l| l.unwrap_or_default()).collect(),
            clusters,
            total_weight,
        })
    }

    fn next_seed(&self, state: &RunState, first_cluster: bool) -> Option<usize> {
        if first_cluster {
            match self.seed.first_index {
                Some(idx) if idx < state.labels.len() => return Some(idx),
                Some(idx) => debug!(
                    "Seed index {} outside dataset of {}, starting at the first record",
                    idx,
                    state.labels.len()
                ),
                None => {}
            }
        }
        state.first_unclustered()
    }

    /// Moves the center to the medoid of its radius ball until it is stable.
    ///
    /// Returns the final center and its ball. With finite distances every move
    /// strictly lowers the ball's summed `distance - radius`, so the search
    /// ends. Non-finite entries in a precomputed matrix can make a center
    /// reappear (a cycle), which ends the search at the current center, or
    /// leave a center outside its own ball, which is an error.
    fn seek_center(
        &self,
        state: &RunState,
        seed: usize,
        radius: F,
    ) -> ForelResult<(usize, Vec<usize>)> {
        let mut visited = vec![false; state.labels.len()];
        let mut center = seed;
        let mut points = self.near_points(state, center, radius);

        loop {
            visited[center] = true;
            let next = self.center_point(&points).ok_or(ForelError::EmptyNeighbourhood {
                center,
                radius: radius.to_f64().unwrap_or(f64::NAN),
            })?;
            if next == center {
                return Ok((center, points));
            }
            if visited[next] {
                warn!(
                    "Center search from {} cycled back to {}, keeping {}",
                    seed, next, center
                );
                return Ok((center, points));
            }
            center = next;
            points = self.near_points(state, center, radius);
        }
    }

    /// Unclustered records within `radius` of `center` (inclusive), ascending.
    fn near_points(&self, state: &RunState, center: usize, radius: F) -> Vec<usize> {
        (0..state.labels.len())
            .filter(|&i| !state.is_clustered(i) && self.metric.distance(center, i) <= radius)
            .collect()
    }

    /// The member with the smallest summed distance to all members.
    ///
    /// Candidates are scanned by ascending record index and only a strictly
    /// smaller sum replaces the best so far, so ties go to the lowest index.
    fn center_point(&self, points: &[usize]) -> Option<usize> {
        let mut best: Option<(usize, F)> = None;
        for &candidate in points {
            let sum = self.cluster_weight(candidate, points);
            let improves = match best {
                Some((_, min)) => sum < min,
                None => true,
            };
            if improves {
                best = Some((candidate, sum));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn cluster_weight(&self, center: usize, points: &[usize]) -> F {
        points
            .iter()
            .fold(F::zero(), |acc, &p| acc + self.metric.distance(center, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrices::{DensityMatrix, DistanceMatrix};
    use ndarray::{array, Array2};

    fn distances(values: Array2<f64>) -> DistanceMatrix<f64> {
        let fields: Vec<String> = (0..values.ncols()).map(|c| format!("f{}", c)).collect();
        let dataset = Dataset::from_unnamed(&fields, values).unwrap();
        DistanceMatrix::build(&dataset).unwrap()
    }

    fn square_with_outlier() -> DistanceMatrix<f64> {
        distances(array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [10.0, 10.0]])
    }

    #[test]
    fn test_center_point_ties_prefer_lowest_index() {
        // Three points on a line, equally spaced: 0 and 2 tie, 1 is the medoid.
        let d = distances(array![[0.0], [1.0], [2.0]]);
        let forel = Forel::new(Metric::Euclidean(&d));
        assert_eq!(forel.center_point(&[0, 1, 2]), Some(1));
        // Two points always tie.
        assert_eq!(forel.center_point(&[0, 2]), Some(0));
        assert_eq!(forel.center_point(&[]), None);
    }

    #[test]
    fn test_near_points_is_inclusive_and_skips_clustered() {
        let d = square_with_outlier();
        let forel = Forel::new(Metric::Euclidean(&d));
        let mut state = RunState::new(4);
        assert_eq!(forel.near_points(&state, 0, 1.0), vec![0, 1, 2]);
        state.commit(&[1], 1);
        assert_eq!(forel.near_points(&state, 0, 1.0), vec![0, 2]);
        assert_eq!(state.unassigned, 3);
    }

    #[test]
    fn test_seed_falls_back_when_out_of_range() {
        let d = square_with_outlier();
        let forel = Forel::new(Metric::Euclidean(&d));
        let state = RunState::new(4);
        assert_eq!(forel.next_seed(&state, true), Some(0));

        let forel = forel.with_seed(SeedPolicy::fixed(3));
        assert_eq!(forel.next_seed(&state, true), Some(3));
        assert_eq!(forel.next_seed(&state, false), Some(0));
    }

    #[test]
    fn test_square_with_outlier() {
        let d = square_with_outlier();
        let partition = Forel::new(Metric::Euclidean(&d)).run(1.5).unwrap();

        assert_eq!(partition.cluster_count(), 2);
        assert_eq!(partition.labels, vec![1, 1, 1, 2]);
        assert_eq!(partition.clusters[0].center_idx, 0);
        assert_eq!(partition.clusters[0].points, vec![0, 1, 2]);
        assert_eq!(partition.clusters[1].points, vec![3]);
        assert!((partition.total_weight - 2.0).abs() < 1e-12);
        assert_eq!(partition.clusters[1].weight, 0.0);
    }

    #[test]
    fn test_fixed_seed_starts_first_cluster() {
        let d = square_with_outlier();
        let partition = Forel::new(Metric::Euclidean(&d))
            .with_seed(SeedPolicy::fixed(3))
            .run(1.5)
            .unwrap();
        assert_eq!(partition.labels, vec![2, 2, 2, 1]);
        assert_eq!(partition.cluster(1).map(|c| c.points.clone()), Some(vec![3]));
    }

    #[test]
    fn test_zero_radius_gives_singletons() {
        let d = square_with_outlier();
        let partition = Forel::new(Metric::Euclidean(&d)).run(0.0).unwrap();
        assert_eq!(partition.cluster_count(), 4);
        assert_eq!(partition.total_weight, 0.0);
        let mut labels = partition.labels.clone();
        labels.sort_unstable();
        assert_eq!(labels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_negative_or_nan_radius_rejected() {
        let d = square_with_outlier();
        let forel = Forel::new(Metric::Euclidean(&d));
        assert!(matches!(forel.run(-1.0), Err(ForelError::Configuration(_))));
        assert!(matches!(forel.run(f64::NAN), Err(ForelError::Configuration(_))));
    }

    #[test]
    fn test_salience_attached_to_multi_member_clusters() {
        let dataset = Dataset::from_unnamed(
            &["x", "y"],
            array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [10.0, 10.0]],
        )
        .unwrap();
        let d = DistanceMatrix::build(&dataset).unwrap();
        let partition = Forel::new(Metric::Euclidean(&d))
            .with_salience(&dataset)
            .run(1.5)
            .unwrap();
        assert!(partition.clusters[0].salience.is_some());
        assert!(partition.clusters[1].salience.is_none());
    }

    #[test]
    fn test_density_weighted_run_covers_everything() {
        let dataset = Dataset::from_unnamed(
            &["x", "y"],
            array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [10.0, 10.0], [11.0, 10.0]],
        )
        .unwrap();
        let d = DistanceMatrix::build(&dataset).unwrap();
        let tau = DensityMatrix::build(&d).unwrap();
        let metric = Metric::select(&d, Some(&tau), true).unwrap();
        let partition = Forel::new(metric).run(metric.diameter()).unwrap();
        assert_eq!(partition.cluster_count(), 1);
        assert!(partition.labels.iter().all(|&l| l == 1));
    }

    #[test]
    fn test_empty_metric_is_insufficient() {
        let d: DistanceMatrix<f64> = DistanceMatrix::from_array(Array2::zeros((0, 0))).unwrap();
        let result = Forel::new(Metric::Euclidean(&d)).run(1.0);
        assert!(matches!(
            result,
            Err(ForelError::InsufficientData {
                required: 1,
                actual: 0
            })
        ));
    }

    #[test]
    fn test_center_outside_own_ball_fails() {
        let d = DistanceMatrix::from_array(array![[f64::NAN, 5.0], [5.0, 0.0]]).unwrap();
        let result = Forel::new(Metric::Euclidean(&d))
            .with_seed(SeedPolicy::fixed(0))
            .run(1.0);
        assert!(matches!(
            result,
            Err(ForelError::EmptyNeighbourhood { center: 0, .. })
        ));
    }

    #[test]
    fn test_center_cycle_keeps_current_center() {
        // 0 is outside its own ball, so the search moves to 1, whose ball
        // contains 0 with a NaN sum that wins the scan and points back to 0.
        let d = DistanceMatrix::from_array(array![[f64::NAN, 1.0], [1.0, 0.0]]).unwrap();
        let partition = Forel::new(Metric::Euclidean(&d))
            .with_seed(SeedPolicy::fixed(0))
            .run(2.0)
            .unwrap();
        assert_eq!(partition.cluster_count(), 1);
        assert_eq!(partition.clusters[0].center_idx, 1);
        assert_eq!(partition.clusters[0].points, vec![0, 1]);
        assert_eq!(partition.labels, vec![1, 1]);
        assert_eq!(partition.total_weight, 1.0);
    }

    #[test]
    fn test_without_salience_clears_dataset() {
        let dataset = Dataset::from_unnamed(&["x"], array![[0.0], [1.0]]).unwrap();
        let d = DistanceMatrix::build(&dataset).unwrap();
        let forel = Forel::new(Metric::Euclidean(&d)).with_salience(&dataset);
        assert!(forel.ranks_salience());
        let forel = forel.without_salience();
        assert!(!forel.ranks_salience());
        let partition = forel.run(5.0).unwrap();
        assert!(partition.clusters[0].salience.is_none());
    }
}
