//! Domain layer: Core types and the reconciliation rules between them.
//!
//! Pure Rust with no I/O. The classifier is reached only through
//! `crate::ports::Classifier`.

mod category;
mod feature;
mod field;
mod form;
mod prediction;
mod vector;

pub use category::Gender;
pub use feature::{
    column_names, ClinicalFeature, FeatureSpec, CATEGORY_COLUMN, CONTINUOUS_FEATURE_COUNT,
    DEFAULT_FEATURE_SPECS, FEATURE_ORDER,
};
pub use field::{ParseError, SyncedField};
pub use form::{FormSnapshot, PredictionForm};
pub use prediction::{ClassifierError, DiagnosticClass, Prediction};
pub use vector::{log1p_transform, FeatureVector, FEATURE_VECTOR_LEN};
