use crate::{Error, FeatureVector, Result};

/// Row-aligned feature vectors, one per catalog entity.
///
/// Row `i` describes catalog entity `i`. Every row has the same dimension and
/// only finite values small enough that the squared distance between any two
/// rows stays finite. The matrix is never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: Vec<FeatureVector>,
    dim: usize,
}

impl FeatureMatrix {
    pub fn new(rows: Vec<FeatureVector>) -> Result<Self> {
        let first = rows
            .first()
            .ok_or_else(|| Error::InvalidConfig("feature matrix is empty".to_string()))?;
        let dim = first.dim();
        if dim == 0 {
            return Err(Error::InvalidConfig(
                "feature vectors must have at least one dimension".to_string(),
            ));
        }

        let limit = magnitude_limit(dim);
        for (row, vector) in rows.iter().enumerate() {
            if vector.dim() != dim {
                return Err(Error::InvalidDimension {
                    expected: dim,
                    actual: vector.dim(),
                });
            }
            if !vector.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "feature row {} contains a non-finite value",
                    row
                )));
            }
            if vector.max_abs() > limit {
                return Err(Error::InvalidConfig(format!(
                    "feature row {} has a value above {:e} in magnitude",
                    row, limit
                )));
            }
        }

        Ok(Self { rows, dim })
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(rows.into_iter().map(FeatureVector::new).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn row(&self, id: usize) -> Option<&FeatureVector> {
        self.rows.get(id)
    }

    #[inline]
    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }
}

/// Largest |x| for which `dim * (2 * |x|)^2` cannot overflow
#[inline]
fn magnitude_limit(dim: usize) -> f64 {
    (f64::MAX / dim as f64).sqrt() / 4.0
}
