//! # Glycosense
//!
//! Diabetes class predictor built around two small pieces of logic:
//! - Synchronized input fields: a bounded control and a free-text entry
//!   for every clinical measurement, kept consistent through a fixed scale
//! - An inference pipeline: `log1p` transform, fixed-order feature vector,
//!   classifier dispatch and class-to-label mapping
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Feature table, synchronized fields, feature vector, prediction classes
//! - `ports`: The classifier boundary
//! - `adapters`: Linear model artifact loader, log sanitization
//! - `application`: The inference pipeline
//! - `config`: Environment-driven settings
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{DiagnosticClass, FeatureVector, Gender, Prediction, PredictionForm, SyncedField};

/// Result type for Glycosense operations
pub type Result<T> = std::result::Result<T, GlycoError>;

/// Main error type for Glycosense
#[derive(Debug, thiserror::Error)]
pub enum GlycoError {
    /// Assembling or classifying the feature vector failed. Shown to the user.
    #[error("{0}")]
    InputOrInference(String),

    #[error("Invalid feature specification: {0}")]
    InvalidFeatureSpec(String),
}
