//! Continuous clinical features and the scales of their input controls.
//!
//! [`FEATURE_ORDER`] is the column order the classifier was trained on.
//! Reordering it silently corrupts every prediction, so it is spelled out
//! once here and checked against the model artifact when the model loads.

use super::vector::FEATURE_VECTOR_LEN;
use crate::GlycoError;

/// Number of continuous (log-transformed) features.
pub const CONTINUOUS_FEATURE_COUNT: usize = 10;

/// Column name of the category selector, always vector position 0.
pub const CATEGORY_COLUMN: &str = "Gender";

/// Continuous clinical measurement collected by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClinicalFeature {
    /// Age in years
    Age,
    /// Blood urea
    Urea,
    /// Serum creatinine
    Creatinine,
    /// Glycated haemoglobin
    Hba1c,
    /// Total cholesterol
    Cholesterol,
    /// Triglycerides
    Triglycerides,
    /// HDL cholesterol
    Hdl,
    /// LDL cholesterol
    Ldl,
    /// VLDL cholesterol
    Vldl,
    /// Body mass index
    Bmi,
}

/// Vector positions 1..=10, in training order.
pub const FEATURE_ORDER: [ClinicalFeature; CONTINUOUS_FEATURE_COUNT] = [
    ClinicalFeature::Age,
    ClinicalFeature::Urea,
    ClinicalFeature::Creatinine,
    ClinicalFeature::Hba1c,
    ClinicalFeature::Cholesterol,
    ClinicalFeature::Triglycerides,
    ClinicalFeature::Hdl,
    ClinicalFeature::Ldl,
    ClinicalFeature::Vldl,
    ClinicalFeature::Bmi,
];

impl ClinicalFeature {
    /// Column code as used by the training data and the model artifact.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Age => "AGE",
            Self::Urea => "Urea",
            Self::Creatinine => "Cr",
            Self::Hba1c => "HbA1c",
            Self::Cholesterol => "Chol",
            Self::Triglycerides => "TG",
            Self::Hdl => "HDL",
            Self::Ldl => "LDL",
            Self::Vldl => "VLDL",
            Self::Bmi => "BMI",
        }
    }

    /// Physical unit shown next to the entry.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Age => "years",
            Self::Urea => "mmol/L",
            Self::Creatinine => "µmol/L",
            Self::Hba1c => "%",
            Self::Cholesterol
            | Self::Triglycerides
            | Self::Hdl
            | Self::Ldl
            | Self::Vldl => "mmol/L",
            Self::Bmi => "kg/m²",
        }
    }

    /// Index into [`FEATURE_ORDER`].
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Age => 0,
            Self::Urea => 1,
            Self::Creatinine => 2,
            Self::Hba1c => 3,
            Self::Cholesterol => 4,
            Self::Triglycerides => 5,
            Self::Hdl => 6,
            Self::Ldl => 7,
            Self::Vldl => 8,
            Self::Bmi => 9,
        }
    }
}

impl std::fmt::Display for ClinicalFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// All vector column names, category first.
#[must_use]
pub fn column_names() -> [&'static str; FEATURE_VECTOR_LEN] {
    let mut names = [CATEGORY_COLUMN; FEATURE_VECTOR_LEN];
    for (slot, feature) in names[1..].iter_mut().zip(FEATURE_ORDER) {
        *slot = feature.code();
    }
    names
}

/// Static bounds and scale of one continuous feature, in physical units.
///
/// A control position `p` stands for the physical value `p * step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpec {
    pub feature: ClinicalFeature,
    pub min_value: f64,
    pub max_value: f64,
    pub step: f64,
    pub default_value: f64,
}

impl FeatureSpec {
    #[must_use]
    pub const fn new(
        feature: ClinicalFeature,
        min_value: f64,
        max_value: f64,
        step: f64,
        default_value: f64,
    ) -> Self {
        Self {
            feature,
            min_value,
            max_value,
            step,
            default_value,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.feature.code()
    }

    /// Check `min <= default <= max` and `step > 0`, all finite.
    ///
    /// # Errors
    /// Returns `GlycoError::InvalidFeatureSpec` describing the first violation.
    pub fn validate(&self) -> Result<(), GlycoError> {
        let name = self.name();
        let all_finite = [self.min_value, self.max_value, self.step, self.default_value]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(GlycoError::InvalidFeatureSpec(format!(
                "{name}: bounds, step and default must be finite"
            )));
        }
        if self.step <= 0.0 {
            return Err(GlycoError::InvalidFeatureSpec(format!(
                "{name}: step must be > 0, got {}",
                self.step
            )));
        }
        if !(self.min_value <= self.default_value && self.default_value <= self.max_value) {
            return Err(GlycoError::InvalidFeatureSpec(format!(
                "{name}: default {} outside [{}, {}]",
                self.default_value, self.min_value, self.max_value
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn min_position(&self) -> i64 {
        (self.min_value / self.step).round() as i64
    }

    #[must_use]
    pub fn max_position(&self) -> i64 {
        (self.max_value / self.step).round() as i64
    }

    #[must_use]
    pub fn default_position(&self) -> i64 {
        self.clamp_position((self.default_value / self.step).round() as i64)
    }

    /// Hold a position inside the control's bounds. An inverted range (a spec
    /// that never went through [`FeatureSpec::validate`]) pins to the minimum.
    #[must_use]
    pub fn clamp_position(&self, position: i64) -> i64 {
        let min = self.min_position();
        position.min(self.max_position()).max(min)
    }

    /// Nearest control position for a physical value, held inside the control's bounds.
    #[must_use]
    pub fn position_for(&self, value: f64) -> i64 {
        // `as` saturates on overflow, the clamp handles the rest.
        self.clamp_position((value / self.step).round() as i64)
    }

    /// Physical value represented by a control position.
    #[must_use]
    pub fn value_at(&self, position: i64) -> f64 {
        position as f64 * self.step
    }

    /// Canonical one-decimal rendering of a control position.
    #[must_use]
    pub fn format_position(&self, position: i64) -> String {
        format!("{:.1}", self.value_at(position))
    }
}

/// Default feature table, in [`FEATURE_ORDER`].
pub const DEFAULT_FEATURE_SPECS: [FeatureSpec; CONTINUOUS_FEATURE_COUNT] = [
    FeatureSpec::new(ClinicalFeature::Age, 20.0, 79.0, 1.0, 55.0),
    FeatureSpec::new(ClinicalFeature::Urea, 0.5, 40.0, 0.1, 4.6),
    FeatureSpec::new(ClinicalFeature::Creatinine, 6.0, 800.0, 1.0, 60.0),
    FeatureSpec::new(ClinicalFeature::Hba1c, 0.9, 16.0, 0.1, 8.0),
    FeatureSpec::new(ClinicalFeature::Cholesterol, 0.0, 10.3, 0.1, 4.8),
    FeatureSpec::new(ClinicalFeature::Triglycerides, 0.3, 13.8, 0.1, 2.0),
    FeatureSpec::new(ClinicalFeature::Hdl, 0.2, 9.9, 0.1, 1.1),
    FeatureSpec::new(ClinicalFeature::Ldl, 0.3, 9.9, 0.1, 2.5),
    FeatureSpec::new(ClinicalFeature::Vldl, 0.1, 35.0, 0.1, 0.9),
    FeatureSpec::new(ClinicalFeature::Bmi, 19.0, 47.8, 0.1, 30.0),
];
