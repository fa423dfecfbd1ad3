//! The whole input form: one synchronized field per continuous feature plus
//! the category selector.

use super::category::Gender;
use super::feature::{
    ClinicalFeature, FeatureSpec, CONTINUOUS_FEATURE_COUNT, DEFAULT_FEATURE_SPECS, FEATURE_ORDER,
};
use super::field::SyncedField;
use crate::GlycoError;

/// Physical values of every field taken at one instant, in `FEATURE_ORDER`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormSnapshot {
    pub gender: Gender,
    pub values: [f64; CONTINUOUS_FEATURE_COUNT],
}

impl FormSnapshot {
    /// Check every value can go through `log1p`: finite and not negative.
    ///
    /// # Errors
    /// Returns `GlycoError::InputOrInference` naming the first bad feature.
    pub fn validate(&self) -> Result<(), GlycoError> {
        for (value, feature) in self.values.iter().zip(FEATURE_ORDER) {
            if !value.is_finite() || *value < 0.0 {
                return Err(GlycoError::InputOrInference(format!(
                    "{feature}: value is not a valid non-negative number"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PredictionForm {
    gender: Gender,
    /// Always `CONTINUOUS_FEATURE_COUNT` long, indexed by `ClinicalFeature::index`.
    fields: Vec<SyncedField>,
}

impl PredictionForm {
    /// Build the form from a feature table.
    ///
    /// # Errors
    /// Returns `GlycoError::InvalidFeatureSpec` if a spec is inconsistent or
    /// the table is not in `FEATURE_ORDER`.
    pub fn new(specs: [FeatureSpec; CONTINUOUS_FEATURE_COUNT]) -> Result<Self, GlycoError> {
        let mut fields = Vec::with_capacity(CONTINUOUS_FEATURE_COUNT);
        for (spec, expected) in specs.into_iter().zip(FEATURE_ORDER) {
            if spec.feature != expected {
                return Err(GlycoError::InvalidFeatureSpec(format!(
                    "expected {} at position {}, got {}",
                    expected,
                    expected.index(),
                    spec.feature
                )));
            }
            fields.push(SyncedField::new(spec)?);
        }

        Ok(Self {
            gender: Gender::default(),
            fields,
        })
    }

    /// Form built from [`DEFAULT_FEATURE_SPECS`].
    ///
    /// # Errors
    /// Only if the built-in table were inconsistent.
    pub fn with_defaults() -> Result<Self, GlycoError> {
        Self::new(DEFAULT_FEATURE_SPECS)
    }

    #[must_use]
    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = gender;
    }

    #[must_use]
    pub fn fields(&self) -> &[SyncedField] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, feature: ClinicalFeature) -> &SyncedField {
        &self.fields[feature.index()]
    }

    pub fn field_mut(&mut self, feature: ClinicalFeature) -> &mut SyncedField {
        &mut self.fields[feature.index()]
    }

    /// Read every field's committed value at once.
    ///
    /// Text still being typed never reaches the snapshot, even when it
    /// parses; only control moves and commits do.
    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot {
        let mut values = [0.0; CONTINUOUS_FEATURE_COUNT];
        for (slot, field) in values.iter_mut().zip(self.fields.iter()) {
            *slot = field.value();
        }

        FormSnapshot {
            gender: self.gender,
            values,
        }
    }

    /// Every field back to its default, selector back to its default.
    pub fn reset(&mut self) {
        for field in self.fields.iter_mut() {
            field.reset();
        }
        self.gender = Gender::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_uses_physical_units() {
        let form = PredictionForm::with_defaults().expect("defaults");
        let snapshot = form.snapshot();

        assert_eq!(snapshot.gender, Gender::Male);
        assert!((snapshot.values[ClinicalFeature::Age.index()] - 55.0).abs() < 1e-9);
        assert!((snapshot.values[ClinicalFeature::Urea.index()] - 4.6).abs() < 1e-9);
        assert!((snapshot.values[ClinicalFeature::Bmi.index()] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_order_table_rejected() {
        let mut specs = DEFAULT_FEATURE_SPECS;
        specs.swap(0, 1);
        let err = PredictionForm::new(specs).expect_err("order must be enforced");
        assert!(matches!(err, GlycoError::InvalidFeatureSpec(_)));
    }

    #[test]
    fn test_snapshot_ignores_uncommitted_text() {
        let mut form = PredictionForm::with_defaults().expect("defaults");
        let _ = form.field_mut(ClinicalFeature::Hba1c).set_from_text("");
        let _ = form.field_mut(ClinicalFeature::Ldl).set_from_text("-");
        form.field_mut(ClinicalFeature::Urea)
            .set_from_text("12.5")
            .expect("numeric text");

        let snapshot = form.snapshot();
        assert!((snapshot.values[ClinicalFeature::Hba1c.index()] - 8.0).abs() < 1e-9);
        assert!((snapshot.values[ClinicalFeature::Ldl.index()] - 2.5).abs() < 1e-9);
        assert!((snapshot.values[ClinicalFeature::Urea.index()] - 4.6).abs() < 1e-9);

        form.field_mut(ClinicalFeature::Urea).commit_text().expect("commit");
        let snapshot = form.snapshot();
        assert!((snapshot.values[ClinicalFeature::Urea.index()] - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_validation() {
        let form = PredictionForm::with_defaults().expect("defaults");
        assert!(form.snapshot().validate().is_ok());

        let mut snapshot = form.snapshot();
        snapshot.values[ClinicalFeature::Triglycerides.index()] = f64::NAN;
        let err = snapshot.validate().expect_err("NaN must be rejected");
        assert!(matches!(err, GlycoError::InputOrInference(_)));
        assert!(err.to_string().starts_with("TG"));

        let mut snapshot = form.snapshot();
        snapshot.values[ClinicalFeature::Hdl.index()] = -0.5;
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_reset() {
        let mut form = PredictionForm::with_defaults().expect("defaults");
        form.set_gender(Gender::Female);
        form.field_mut(ClinicalFeature::Age).set_from_control(70);
        form.reset();
        assert_eq!(form.gender(), Gender::Male);
        assert_eq!(form.field(ClinicalFeature::Age).position(), 55);
    }
}
