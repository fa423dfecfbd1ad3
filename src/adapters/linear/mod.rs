//! Linear model adapter: `Classifier` backed by an exported linear SVM.
//!
//! The training pipeline exports the fitted one-vs-rest decision functions as
//! JSON (`model.json`):
//!
//! ```json
//! {
//!   "model_name": "svm_diabetes",
//!   "feature_names": ["Gender", "AGE", "Urea", "Cr", "HbA1c", "Chol", "TG", "HDL", "LDL", "VLDL", "BMI"],
//!   "classes": [0, 1, 2],
//!   "coefficients": [[...], [...], [...]],
//!   "intercepts": [..., ..., ...]
//! }
//! ```
//!
//! One coefficient row per class scores `w·x + b`; the highest score wins.
//! A binary model may carry a single row, in which case a positive score
//! selects `classes[1]`.
//!
//! # Security
//!
//! - `feature_names` must equal the form's column order exactly. The order is
//!   otherwise a silent contract, so a mismatch refuses to load.
//! - An optional SHA-256 pin verifies the artifact bytes before parsing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{column_names, ClassifierError, FeatureVector, FEATURE_VECTOR_LEN};
use crate::ports::Classifier;

/// File looked up when the model path is a directory.
pub const MODEL_FILE_NAME: &str = "model.json";

/// Model parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLinearModel {
    #[serde(default)]
    pub model_name: Option<String>,
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl ExportedLinearModel {
    fn validate(&self) -> Result<(), ClassifierError> {
        let form_columns: Vec<String> = column_names().iter().map(|s| (*s).to_string()).collect();
        if self.feature_names != form_columns {
            return Err(ClassifierError::FeatureOrder {
                model_columns: self.feature_names.clone(),
                form_columns,
            });
        }

        if self.classes.len() < 2 {
            return Err(ClassifierError::Artifact(format!(
                "need at least 2 classes, got {}",
                self.classes.len()
            )));
        }

        let binary_single_row = self.classes.len() == 2 && self.coefficients.len() == 1;
        if self.coefficients.len() != self.classes.len() && !binary_single_row {
            return Err(ClassifierError::Artifact(format!(
                "coefficient rows ({}) do not match classes ({})",
                self.coefficients.len(),
                self.classes.len()
            )));
        }
        if self.intercepts.len() != self.coefficients.len() {
            return Err(ClassifierError::Artifact(format!(
                "intercepts ({}) do not match coefficient rows ({})",
                self.intercepts.len(),
                self.coefficients.len()
            )));
        }

        for (i, row) in self.coefficients.iter().enumerate() {
            if row.len() != FEATURE_VECTOR_LEN {
                return Err(ClassifierError::Artifact(format!(
                    "coefficient row {i} has {} weights, expected {FEATURE_VECTOR_LEN}",
                    row.len()
                )));
            }
        }

        let all_finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(self.intercepts.iter())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ClassifierError::Artifact(
                "model parameters must be finite".into(),
            ));
        }

        Ok(())
    }
}

/// Linear one-vs-rest classifier loaded once at startup.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    model: ExportedLinearModel,
    name: String,
}

impl LinearClassifier {
    /// Build from already-parsed parameters.
    ///
    /// # Errors
    /// Returns `ClassifierError` if shapes, values or feature order are invalid.
    pub fn from_model(model: ExportedLinearModel) -> Result<Self, ClassifierError> {
        model.validate()?;
        let name = model
            .model_name
            .clone()
            .unwrap_or_else(|| "linear-svm".to_string());
        Ok(Self { model, name })
    }

    /// Load `model.json` from a directory, or the given file directly.
    ///
    /// When `expected_sha256` is set, the artifact bytes must hash to it.
    ///
    /// # Errors
    /// Returns error if the file is missing, fails the pin, or is invalid.
    pub fn load(model_path: &Path, expected_sha256: Option<&str>) -> Result<Self, ClassifierError> {
        let file = resolve_model_file(model_path);
        let bytes = fs::read(&file).map_err(|e| {
            ClassifierError::Artifact(format!("Failed to read {}: {e}", file.display()))
        })?;

        match expected_sha256 {
            Some(pin) => {
                let actual = sha256_hex(&bytes);
                if !constant_time_eq_str(&actual, &pin.trim().to_ascii_lowercase()) {
                    tracing::error!("Model artifact {:?} does not match the configured SHA-256", file);
                    return Err(ClassifierError::IntegrityMismatch);
                }
                tracing::info!("Model artifact hash verified");
            }
            None => tracing::warn!("No model SHA-256 pin configured; loading unverified artifact"),
        }

        let model: ExportedLinearModel = serde_json::from_slice(&bytes)
            .map_err(|e| ClassifierError::Artifact(format!("Invalid model JSON: {e}")))?;
        let classifier = Self::from_model(model)?;

        tracing::info!(
            "Loaded model '{}' from {:?} (classes={:?}, n_features={})",
            classifier.name,
            file,
            classifier.model.classes,
            FEATURE_VECTOR_LEN
        );
        Ok(classifier)
    }

    #[must_use]
    pub fn classes(&self) -> &[i64] {
        &self.model.classes
    }

    /// Raw decision scores, one per coefficient row.
    #[must_use]
    pub fn decision_function(&self, vector: &FeatureVector) -> Vec<f64> {
        self.model
            .coefficients
            .iter()
            .zip(self.model.intercepts.iter())
            .map(|(row, intercept)| {
                row.iter()
                    .zip(vector.as_slice())
                    .map(|(w, x)| w * x)
                    .sum::<f64>()
                    + intercept
            })
            .collect()
    }
}

impl Classifier for LinearClassifier {
    fn classify(&self, vector: &FeatureVector) -> Result<i64, ClassifierError> {
        let scores = self.decision_function(vector);
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(ClassifierError::MalformedResponse(
                "non-finite decision score".into(),
            ));
        }

        let index = if scores.len() == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            // First maximum wins on ties.
            let mut best = 0;
            for (i, score) in scores.iter().enumerate().skip(1) {
                if *score > scores[best] {
                    best = i;
                }
            }
            best
        };

        self.model.classes.get(index).copied().ok_or_else(|| {
            ClassifierError::MalformedResponse(format!("no class at index {index}"))
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn resolve_model_file(model_path: &Path) -> PathBuf {
    if model_path.is_dir() {
        model_path.join(MODEL_FILE_NAME)
    } else {
        model_path.to_path_buf()
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// Constant-time compare for ASCII strings (used for SHA-256 hex digests).
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
