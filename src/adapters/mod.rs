//! Adapters layer: Concrete implementations of ports.
//!
//! - `linear`: exported linear SVM behind the `Classifier` port
//! - `sanitize`: clinical-value filtering for logs

pub mod linear;
pub mod sanitize;

pub use linear::LinearClassifier;
