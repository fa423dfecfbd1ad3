//! Inference pipeline: form state -> feature vector -> class -> display pair.
//!
//! The pipeline:
//! - Snapshots every field's committed value at once
//! - Applies `log1p` to continuous values, passes the category through
//! - Calls the classifier exactly once
//! - Maps the class id to a label and severity color

use std::sync::Arc;

use crate::domain::{FeatureVector, FormSnapshot, Prediction, PredictionForm};
use crate::ports::Classifier;
use crate::GlycoError;

/// Runs predictions against a classifier loaded once at startup.
pub struct InferencePipeline<C>
where
    C: Classifier + ?Sized,
{
    classifier: Arc<C>,
}

impl<C> InferencePipeline<C>
where
    C: Classifier + ?Sized,
{
    pub fn new(classifier: Arc<C>) -> Self {
        Self { classifier }
    }

    #[must_use]
    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Predict from the form as it is right now.
    ///
    /// The form is snapshotted before the classifier runs, so the vector can
    /// never mix values from before and after an edit.
    ///
    /// # Errors
    /// Returns `GlycoError::InputOrInference` if a field holds no usable value
    /// or the classifier fails. Nothing is produced in that case.
    pub fn predict_current_state(&self, form: &PredictionForm) -> Result<Prediction, GlycoError> {
        self.predict_snapshot(&form.snapshot())
    }

    /// Predict from an already captured snapshot.
    ///
    /// # Errors
    /// Returns `GlycoError::InputOrInference` if a value cannot be transformed
    /// or the classifier fails. The classifier is not called for bad input.
    pub fn predict_snapshot(&self, snapshot: &FormSnapshot) -> Result<Prediction, GlycoError> {
        snapshot.validate()?;
        let vector = FeatureVector::from_snapshot(snapshot);
        tracing::debug!("Assembled feature vector ({} columns)", vector.as_slice().len());

        let class_id = self.classifier.classify(&vector).map_err(|e| {
            tracing::warn!("Classifier '{}' failed: {}", self.classifier.name(), e);
            GlycoError::InputOrInference(format!("Prediction failed: {e}"))
        })?;

        let prediction = Prediction::from_class_id(class_id);
        tracing::info!(
            class_id,
            label = prediction.class.label(),
            "Prediction complete"
        );
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ClassifierError, ClinicalFeature, DiagnosticClass, Gender, FEATURE_ORDER,
        FEATURE_VECTOR_LEN,
    };
    use std::sync::Mutex;

    /// Returns a fixed id and records every vector it sees.
    struct RecordingClassifier {
        class_id: i64,
        seen: Mutex<Vec<FeatureVector>>,
    }

    impl RecordingClassifier {
        fn new(class_id: i64) -> Arc<Self> {
            Arc::new(Self {
                class_id,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<FeatureVector> {
            self.seen.lock().expect("lock").clone()
        }
    }

    impl Classifier for RecordingClassifier {
        fn classify(&self, vector: &FeatureVector) -> Result<i64, ClassifierError> {
            self.seen.lock().expect("lock").push(*vector);
            Ok(self.class_id)
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn classify(&self, _vector: &FeatureVector) -> Result<i64, ClassifierError> {
            Err(ClassifierError::MalformedResponse("empty output".into()))
        }
    }

    fn default_form() -> PredictionForm {
        PredictionForm::with_defaults().expect("defaults")
    }

    #[test]
    fn test_default_form_end_to_end() {
        let classifier = RecordingClassifier::new(2);
        let pipeline = InferencePipeline::new(classifier.clone());
        let form = default_form();

        let prediction = pipeline.predict_current_state(&form).expect("prediction");
        assert_eq!(prediction.class, DiagnosticClass::Diabetes);
        assert_eq!(prediction.display(), ("Diabetes (Y)", "#c0392b"));

        let calls = classifier.calls();
        assert_eq!(calls.len(), 1);
        let vector = calls[0];
        assert_eq!(vector.as_slice().len(), FEATURE_VECTOR_LEN);
        assert_eq!(vector.category(), 0.0);
        assert!((vector.get(ClinicalFeature::Age) - 4.025).abs() < 1e-3);
        assert!((vector.get(ClinicalFeature::Age) - 55.0_f64.ln_1p()).abs() < 1e-12);
        for feature in FEATURE_ORDER {
            let raw = form.field(feature).value();
            assert!((vector.get(feature) - raw.ln_1p()).abs() < 1e-12, "{feature}");
        }
    }

    #[test]
    fn test_category_passes_through_untransformed() {
        let classifier = RecordingClassifier::new(0);
        let pipeline = InferencePipeline::new(classifier.clone());
        let mut form = default_form();
        form.set_gender(Gender::Female);

        pipeline.predict_current_state(&form).expect("prediction");
        assert_eq!(classifier.calls()[0].category(), 1.0);
    }

    #[test]
    fn test_repeated_predictions_are_identical() {
        let pipeline = InferencePipeline::new(RecordingClassifier::new(1));
        let form = default_form();

        let first = pipeline.predict_current_state(&form).expect("first");
        let second = pipeline.predict_current_state(&form).expect("second");
        assert_eq!(first.display(), second.display());
        assert_eq!(first.display(), ("Prediabetes (P)", "#f39c12"));
    }

    #[test]
    fn test_unknown_class_is_not_an_error() {
        let pipeline = InferencePipeline::new(RecordingClassifier::new(7));
        let prediction = pipeline
            .predict_current_state(&default_form())
            .expect("unknown is a valid outcome");
        assert_eq!(prediction.class, DiagnosticClass::Unknown(7));
        assert_eq!(prediction.display(), ("Unknown", "#7f8c8d"));
    }

    #[test]
    fn test_classifier_failure_is_input_or_inference_error() {
        let pipeline = InferencePipeline::new(Arc::new(FailingClassifier));
        let err = pipeline
            .predict_current_state(&default_form())
            .expect_err("classifier failure must surface");
        assert!(matches!(err, GlycoError::InputOrInference(_)));
        assert!(err.to_string().contains("empty output"));
    }

    #[test]
    fn test_uncommitted_text_is_not_read() {
        let classifier = RecordingClassifier::new(0);
        let pipeline = InferencePipeline::new(classifier.clone());
        let mut form = default_form();

        form.field_mut(ClinicalFeature::Bmi).set_from_control(250);
        let _ = form.field_mut(ClinicalFeature::Bmi).set_from_text("3");
        let _ = form.field_mut(ClinicalFeature::Hba1c).set_from_text("-");
        form.field_mut(ClinicalFeature::Age)
            .set_from_text("70")
            .expect("numeric text");

        pipeline.predict_current_state(&form).expect("prediction");
        let vector = classifier.calls()[0];
        assert!((vector.get(ClinicalFeature::Bmi) - 25.0_f64.ln_1p()).abs() < 1e-9);
        assert!((vector.get(ClinicalFeature::Hba1c) - 8.0_f64.ln_1p()).abs() < 1e-9);
        assert!((vector.get(ClinicalFeature::Age) - 55.0_f64.ln_1p()).abs() < 1e-9);
    }

    #[test]
    fn test_bad_snapshot_never_reaches_classifier() {
        let classifier = RecordingClassifier::new(0);
        let pipeline = InferencePipeline::new(classifier.clone());
        let mut snapshot = default_form().snapshot();
        snapshot.values[ClinicalFeature::Ldl.index()] = f64::INFINITY;

        let err = pipeline
            .predict_snapshot(&snapshot)
            .expect_err("infinite value must be rejected");
        assert!(matches!(err, GlycoError::InputOrInference(_)));
        assert!(err.to_string().contains("LDL"));
        assert!(classifier.calls().is_empty());
    }

    #[test]
    fn test_works_through_trait_object() {
        let classifier: Arc<dyn Classifier> = RecordingClassifier::new(0);
        let pipeline = InferencePipeline::new(classifier);
        assert_eq!(pipeline.classifier_name(), "classifier");
        let prediction = pipeline.predict_current_state(&default_form()).expect("prediction");
        assert_eq!(prediction.class, DiagnosticClass::Normal);
    }
}
