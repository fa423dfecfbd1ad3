//! Classifier port: the boundary to the pre-trained model.
//!
//! The pipeline depends on nothing but this signature. How the model was
//! trained, serialized or loaded stays behind the implementation.

use crate::domain::{ClassifierError, FeatureVector};

/// A loaded, read-only classifier used as a pure function.
pub trait Classifier: Send + Sync {
    /// Predict the class id for one feature vector.
    ///
    /// # Errors
    /// Returns `ClassifierError` if the model cannot score the vector or
    /// produces a malformed response.
    fn classify(&self, vector: &FeatureVector) -> Result<i64, ClassifierError>;

    /// Short human-readable name for logs and the status line.
    fn name(&self) -> &str {
        "classifier"
    }
}
