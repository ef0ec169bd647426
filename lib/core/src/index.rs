use crate::{Error, FeatureMatrix, FeatureVector, Result};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BinaryHeap;
use tracing::debug;

/// Configuration for a neighbor index
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Neighbors returned by [`NeighborIndex::query_default`]
    pub default_k: usize,
    /// Row count from which the distance scan runs on the rayon pool
    pub parallel_threshold: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            default_k: 5,
            parallel_threshold: 4096,
        }
    }
}

/// One recommended entity and its Euclidean distance from the query entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub entity_id: usize,
    pub distance: f64,
}

/// Neighbors ordered by ascending distance, then ascending id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighborResult {
    pub neighbors: Vec<Neighbor>,
}

impl NeighborResult {
    #[inline]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Neighbor> {
        self.neighbors.iter()
    }

    pub fn ids(&self) -> Vec<usize> {
        self.neighbors.iter().map(|n| n.entity_id).collect()
    }
}

/// Ranking key: squared distance first, entity id second
type Candidate = (OrderedFloat<f64>, usize);

/// Exact Euclidean nearest-neighbor index over a static feature matrix.
///
/// The index never changes after [`NeighborIndex::build`] returns, so a
/// shared reference can be queried from any number of threads.
#[derive(Debug, Clone)]
pub struct NeighborIndex {
    matrix: FeatureMatrix,
    config: IndexConfig,
}

impl NeighborIndex {
    /// Build an index whose default neighbor count is `k`
    pub fn build(matrix: FeatureMatrix, k: usize) -> Result<Self> {
        Self::with_config(
            matrix,
            IndexConfig {
                default_k: k,
                ..IndexConfig::default()
            },
        )
    }

    pub fn with_config(matrix: FeatureMatrix, config: IndexConfig) -> Result<Self> {
        if config.default_k == 0 {
            return Err(Error::InvalidConfig("k must be at least 1".to_string()));
        }

        debug!(
            rows = matrix.len(),
            dim = matrix.dim(),
            default_k = config.default_k,
            "built neighbor index"
        );
        Ok(Self { matrix, config })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    #[inline]
    pub fn default_k(&self) -> usize {
        self.config.default_k
    }

    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    /// The `k` entities closest to `entity_id`, excluding itself.
    ///
    /// `k` is capped at `len - 1`. Fails with [`Error::OutOfRange`] when
    /// `entity_id` has no row in the matrix.
    pub fn query(&self, entity_id: usize, k: usize) -> Result<NeighborResult> {
        let target = self.matrix.row(entity_id).ok_or(Error::OutOfRange {
            id: entity_id,
            len: self.matrix.len(),
        })?;

        let take = k.min(self.matrix.len() - 1);
        let neighbors: Vec<Neighbor> = self
            .nearest(target, entity_id, take)
            .into_iter()
            .map(|(squared, id)| Neighbor {
                entity_id: id,
                distance: squared.into_inner().sqrt(),
            })
            .collect();

        debug!(entity_id, k, returned = neighbors.len(), "neighbor query");
        Ok(NeighborResult { neighbors })
    }

    pub fn query_default(&self, entity_id: usize) -> Result<NeighborResult> {
        self.query(entity_id, self.config.default_k)
    }

    /// Best `take` candidates sorted ascending, skipping the `exclude` row
    fn nearest(&self, target: &FeatureVector, exclude: usize, take: usize) -> Vec<Candidate> {
        if take == 0 {
            return Vec::new();
        }

        let rows = self.matrix.rows();
        let heap = if rows.len() >= self.config.parallel_threshold {
            rows.par_iter()
                .enumerate()
                .filter(|(id, _)| *id != exclude)
                .fold(BinaryHeap::new, |mut heap, (id, row)| {
                    push_bounded(&mut heap, (OrderedFloat(target.squared_l2(row)), id), take);
                    heap
                })
                .reduce(BinaryHeap::new, |mut left, right| {
                    for candidate in right {
                        push_bounded(&mut left, candidate, take);
                    }
                    left
                })
        } else {
            let mut heap = BinaryHeap::with_capacity(take + 1);
            for (id, row) in rows.iter().enumerate() {
                if id != exclude {
                    push_bounded(&mut heap, (OrderedFloat(target.squared_l2(row)), id), take);
                }
            }
            heap
        };

        heap.into_sorted_vec()
    }
}

/// Keep at most `cap` smallest candidates in a max-heap
#[inline]
fn push_bounded(heap: &mut BinaryHeap<Candidate>, candidate: Candidate, cap: usize) {
    if heap.len() < cap {
        heap.push(candidate);
    } else if let Some(worst) = heap.peek() {
        if candidate < *worst {
            heap.pop();
            heap.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn line_index(n: usize) -> NeighborIndex {
        let rows: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64, 0.0]).collect();
        NeighborIndex::build(FeatureMatrix::from_rows(rows).unwrap(), 5).unwrap()
    }

    fn random_index(n: usize, dim: usize, parallel_threshold: usize) -> NeighborIndex {
        let mut rng = StdRng::seed_from_u64(7);
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|_| (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect())
            .collect();
        let config = IndexConfig {
            default_k: 5,
            parallel_threshold,
        };
        NeighborIndex::with_config(FeatureMatrix::from_rows(rows).unwrap(), config).unwrap()
    }

    #[test]
    fn test_zero_k_rejected_at_build() {
        let matrix = FeatureMatrix::from_rows(vec![vec![0.0]]).unwrap();
        assert!(matches!(NeighborIndex::build(matrix, 0), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_query_excludes_self_and_orders_by_distance() {
        let index = line_index(10);
        let result = index.query(4, 4).unwrap();

        assert_eq!(result.ids(), vec![3, 5, 2, 6]);
        let distances: Vec<f64> = result.iter().map(|n| n.distance).collect();
        assert_eq!(distances, vec![1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_reported_distance_is_euclidean() {
        let matrix = FeatureMatrix::from_rows(vec![vec![0.0, 0.0], vec![3.0, 4.0]]).unwrap();
        let index = NeighborIndex::build(matrix, 1).unwrap();
        let result = index.query(0, 1).unwrap();
        assert_eq!(result.neighbors, vec![Neighbor { entity_id: 1, distance: 5.0 }]);
    }

    #[test]
    fn test_k_is_capped() {
        let index = line_index(3);
        let result = index.query(1, 6).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.ids(), vec![0, 2]);
    }

    #[test]
    fn test_single_row_has_no_neighbors() {
        let index = line_index(1);
        assert!(index.query(0, 3).unwrap().is_empty());
    }

    #[test]
    fn test_zero_k_query_is_empty() {
        assert!(line_index(4).query(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range() {
        let index = line_index(10);
        assert_eq!(
            index.query(100, 5).unwrap_err(),
            Error::OutOfRange { id: 100, len: 10 }
        );
        assert!(index.query(10, 5).is_err());
    }

    #[test]
    fn test_identical_vectors_tie_break_by_id() {
        let rows = vec![vec![0.5, 0.5, 0.5]; 6];
        let index = NeighborIndex::build(FeatureMatrix::from_rows(rows).unwrap(), 5).unwrap();

        for id in 0..6 {
            let result = index.query(id, 10).unwrap();
            let expected: Vec<usize> = (0..6).filter(|other| *other != id).collect();
            assert_eq!(result.ids(), expected);
            assert!(result.iter().all(|n| n.distance == 0.0));
        }
    }

    #[test]
    fn test_large_magnitudes_rank_by_distance() {
        let matrix = FeatureMatrix::from_rows(vec![vec![0.0], vec![2e150], vec![1e150]]).unwrap();
        let index = NeighborIndex::build(matrix, 2).unwrap();
        let result = index.query(0, 2).unwrap();

        assert_eq!(result.ids(), vec![2, 1]);
        assert!(result.iter().all(|n| n.distance.is_finite()));
        assert!((result.neighbors[0].distance / 1e150 - 1.0).abs() < 1e-12);
        assert!((result.neighbors[1].distance / 2e150 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_scan_breaks_ties_by_id() {
        let config = IndexConfig {
            default_k: 5,
            parallel_threshold: 1,
        };
        let rows = vec![vec![2.0, -1.0]; 40];
        let index =
            NeighborIndex::with_config(FeatureMatrix::from_rows(rows).unwrap(), config).unwrap();

        for id in [0, 17, 39] {
            let result = index.query(id, 39).unwrap();
            let expected: Vec<usize> = (0..40).filter(|other| *other != id).collect();
            assert_eq!(result.ids(), expected);
            assert!(result.iter().all(|n| n.distance == 0.0));

            let first_five: Vec<usize> = expected.iter().copied().take(5).collect();
            assert_eq!(index.query(id, 5).unwrap().ids(), first_five);
        }
    }

    #[test]
    fn test_query_default_uses_build_k() {
        let index = line_index(20);
        assert_eq!(index.default_k(), 5);
        assert_eq!(index.query_default(0).unwrap().len(), 5);
    }

    #[test]
    fn test_matches_brute_force() {
        let index = random_index(200, 8, usize::MAX);
        let rows = index.matrix().rows();

        for id in [0, 17, 199] {
            let mut expected: Vec<(f64, usize)> = rows
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != id)
                .map(|(other, row)| (rows[id].squared_l2(row), other))
                .collect();
            expected.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            let expected_ids: Vec<usize> =
                expected.iter().take(7).map(|(_, other)| *other).collect();

            assert_eq!(index.query(id, 7).unwrap().ids(), expected_ids);
        }
    }

    #[test]
    fn test_parallel_scan_matches_sequential() {
        let sequential = random_index(500, 6, usize::MAX);
        let parallel = random_index(500, 6, 1);

        for id in [0, 250, 499] {
            assert_eq!(sequential.query(id, 9).unwrap(), parallel.query(id, 9).unwrap());
        }
    }

    #[test]
    fn test_query_is_idempotent() {
        let index = random_index(300, 5, 64);
        let first = index.query(42, 10).unwrap();
        for _ in 0..5 {
            let again = index.query(42, 10).unwrap();
            assert_eq!(first.ids(), again.ids());
            for (a, b) in first.iter().zip(again.iter()) {
                assert_eq!(a.distance.to_bits(), b.distance.to_bits());
            }
        }
    }

    #[test]
    fn test_distances_non_decreasing() {
        let index = random_index(150, 4, usize::MAX);
        for id in 0..150 {
            let result = index.query(id, 12).unwrap();
            assert_eq!(result.len(), 12);
            assert!(!result.ids().contains(&id));
            for pair in result.neighbors.windows(2) {
                assert!(pair[0].distance <= pair[1].distance);
                if pair[0].distance == pair[1].distance {
                    assert!(pair[0].entity_id < pair[1].entity_id);
                }
            }
        }
    }
}
