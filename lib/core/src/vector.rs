use serde::{Deserialize, Serialize};

/// A fixed-length feature vector describing one catalog entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FeatureVector {
    data: Vec<f64>,
}

impl FeatureVector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Largest absolute component, 0 for an empty vector
    #[inline]
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0f64, |max, x| max.max(x.abs()))
    }

    /// Squared Euclidean distance, used for ranking
    #[inline]
    pub fn squared_l2(&self, other: &FeatureVector) -> f64 {
        squared_l2(&self.data, &other.data)
    }

    /// Euclidean distance
    #[inline]
    pub fn l2_distance(&self, other: &FeatureVector) -> f64 {
        self.squared_l2(other).sqrt()
    }
}

/// Squared L2 distance with two accumulators for better pipelining.
///
/// The summation order depends only on the slice length, so the result for a
/// given pair of slices is always bit-identical.
#[inline]
pub fn squared_l2(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }

    let mut sum0 = 0.0f64;
    let mut sum1 = 0.0f64;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder();
    let b_chunks = b.chunks_exact(4);

    for (x, y) in chunks.zip(b_chunks) {
        let d0 = x[0] - y[0];
        let d1 = x[1] - y[1];
        let d2 = x[2] - y[2];
        let d3 = x[3] - y[3];
        sum0 += d0 * d0 + d1 * d1;
        sum1 += d2 * d2 + d3 * d3;
    }

    for i in (a.len() - remainder.len())..a.len() {
        let d = a[i] - b[i];
        sum0 += d * d;
    }

    sum0 + sum1
}
