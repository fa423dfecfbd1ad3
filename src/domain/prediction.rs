//! Prediction result types.
//!
//! Maps the classifier's integer output onto the diagnostic classes it was
//! trained with.

/// Diagnostic class predicted by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticClass {
    /// Class 0, non-diabetic
    Normal,
    /// Class 1
    Prediabetes,
    /// Class 2
    Diabetes,
    /// Any id outside the trained enumeration. A valid outcome, not an error.
    Unknown(i64),
}

impl DiagnosticClass {
    #[must_use]
    pub fn from_class_id(class_id: i64) -> Self {
        match class_id {
            0 => Self::Normal,
            1 => Self::Prediabetes,
            2 => Self::Diabetes,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn class_id(&self) -> i64 {
        match self {
            Self::Normal => 0,
            Self::Prediabetes => 1,
            Self::Diabetes => 2,
            Self::Unknown(id) => *id,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal (N)",
            Self::Prediabetes => "Prediabetes (P)",
            Self::Diabetes => "Diabetes (Y)",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Severity color as a hex string for the host UI.
    #[must_use]
    pub fn color_hex(&self) -> &'static str {
        match self {
            Self::Normal => "#27ae60",
            Self::Prediabetes => "#f39c12",
            Self::Diabetes => "#c0392b",
            Self::Unknown(_) => "#7f8c8d",
        }
    }

    /// Same color as RGB, for terminal rendering.
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Normal => (39, 174, 96),       // Green (#27ae60)
            Self::Prediabetes => (243, 156, 18), // Amber (#f39c12)
            Self::Diabetes => (192, 57, 43),     // Red (#c0392b)
            Self::Unknown(_) => (127, 140, 141), // Gray (#7f8c8d)
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Normal => "No diabetic pattern in the entered values",
            Self::Prediabetes => "Borderline pattern - follow-up recommended",
            Self::Diabetes => "Diabetic pattern - clinical confirmation advised",
            Self::Unknown(_) => "The model returned a class outside its known set",
        }
    }
}

impl std::fmt::Display for DiagnosticClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One prediction, as shown to the user. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub class: DiagnosticClass,

    pub predicted_at: chrono::DateTime<chrono::Utc>,
}

impl Prediction {
    #[must_use]
    pub fn from_class_id(class_id: i64) -> Self {
        Self {
            class: DiagnosticClass::from_class_id(class_id),
            predicted_at: chrono::Utc::now(),
        }
    }

    /// `(label, severity_color)` pair for display.
    #[must_use]
    pub fn display(&self) -> (&'static str, &'static str) {
        (self.class.label(), self.class.color_hex())
    }
}

/// Errors raised by a classifier implementation.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Model artifact error: {0}")]
    Artifact(String),

    #[error("Model artifact hash mismatch")]
    IntegrityMismatch,

    #[error("Feature order mismatch: model expects {model_columns:?}, form provides {form_columns:?}")]
    FeatureOrder {
        model_columns: Vec<String>,
        form_columns: Vec<String>,
    },

    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),

    #[error("Classification failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_mapping() {
        assert_eq!(
            Prediction::from_class_id(0).display(),
            ("Normal (N)", "#27ae60")
        );
        assert_eq!(
            Prediction::from_class_id(1).display(),
            ("Prediabetes (P)", "#f39c12")
        );
        assert_eq!(
            Prediction::from_class_id(2).display(),
            ("Diabetes (Y)", "#c0392b")
        );
    }

    #[test]
    fn test_out_of_enumeration_is_unknown() {
        for id in [-1, 3, 42, i64::MAX, i64::MIN] {
            let class = DiagnosticClass::from_class_id(id);
            assert_eq!(class, DiagnosticClass::Unknown(id));
            assert_eq!(class.label(), "Unknown");
            assert_eq!(class.color_hex(), "#7f8c8d");
            assert_eq!(class.class_id(), id);
        }
    }

    #[test]
    fn test_rgb_matches_hex() {
        for id in 0..4 {
            let class = DiagnosticClass::from_class_id(id);
            let (r, g, b) = class.color();
            assert_eq!(format!("#{r:02x}{g:02x}{b:02x}"), class.color_hex());
        }
    }
}
