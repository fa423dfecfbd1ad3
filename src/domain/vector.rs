//! Model-ready feature vector.

use super::feature::{ClinicalFeature, CONTINUOUS_FEATURE_COUNT};
use super::form::FormSnapshot;

/// Category selector plus every continuous feature.
pub const FEATURE_VECTOR_LEN: usize = CONTINUOUS_FEATURE_COUNT + 1;

/// `ln(1 + value)`. Defined and exact at zero, unlike a plain `ln`.
#[must_use]
pub fn log1p_transform(value: f64) -> f64 {
    value.ln_1p()
}

/// Fixed-order vector handed to the classifier.
///
/// Position 0 is the raw category; positions 1.. are `log1p` of each
/// physical value in `FEATURE_ORDER`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_VECTOR_LEN]);

impl FeatureVector {
    #[must_use]
    pub fn from_snapshot(snapshot: &FormSnapshot) -> Self {
        let mut values = [0.0; FEATURE_VECTOR_LEN];
        values[0] = f64::from(snapshot.gender.raw());
        for (slot, raw) in values[1..].iter_mut().zip(snapshot.values.iter()) {
            *slot = log1p_transform(*raw);
        }
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn category(&self) -> f64 {
        self.0[0]
    }

    /// Transformed value of one continuous feature.
    #[must_use]
    pub fn get(&self, feature: ClinicalFeature) -> f64 {
        self.0[feature.index() + 1]
    }
}
