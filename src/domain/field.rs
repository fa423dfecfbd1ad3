//! Synchronized input field: one bounded control and one text entry for the
//! same physical quantity.
//!
//! The control position is the single source of truth. Each view has its own
//! one-directional update path and neither path calls the other, so an edit
//! can never bounce back and forth between the two:
//!
//! - [`SyncedField::set_from_control`] writes the text, never the position
//!   beyond the clamp the control itself applies.
//! - [`SyncedField::set_from_text`] writes the live position, never reformats
//!   the text and never touches the committed position.
//! - [`SyncedField::commit_text`] goes text -> position -> text exactly once.
//!
//! The committed position is what the field reports as its value. Only the
//! control path writes it, so text still being typed is never read as input.

use zeroize::Zeroize;

use super::feature::{ClinicalFeature, FeatureSpec};
use crate::GlycoError;

/// Text that does not parse as a finite number. Local to the field; the
/// position is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: entry is not a finite number")]
pub struct ParseError {
    pub field: &'static str,
}

#[derive(Debug, Clone)]
pub struct SyncedField {
    spec: FeatureSpec,
    /// Follows the text while typing, drives the gauge.
    position: i64,
    /// Last control-derived position.
    committed: i64,
    text: String,
}

impl SyncedField {
    /// Create a field at its default position with canonical text.
    ///
    /// # Errors
    /// Returns `GlycoError::InvalidFeatureSpec` if the spec is inconsistent.
    pub fn new(spec: FeatureSpec) -> Result<Self, GlycoError> {
        spec.validate()?;
        let position = spec.default_position();
        Ok(Self {
            spec,
            position,
            committed: position,
            text: spec.format_position(position),
        })
    }

    #[must_use]
    pub fn spec(&self) -> &FeatureSpec {
        &self.spec
    }

    #[must_use]
    pub fn feature(&self) -> ClinicalFeature {
        self.spec.feature
    }

    /// Current control position, including a parsed but uncommitted edit.
    #[must_use]
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Position set by the control or by the last commit.
    #[must_use]
    pub fn committed_position(&self) -> i64 {
        self.committed
    }

    /// Current text, possibly an uncommitted edit.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Physical-unit value of the committed position.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.spec.value_at(self.committed)
    }

    /// Fraction of the control's travel, for gauges.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        let min = self.spec.min_position();
        let span = self.spec.max_position() - min;
        if span <= 0 {
            return 0.0;
        }
        ((self.position - min) as f64 / span as f64).clamp(0.0, 1.0)
    }

    /// True while the text differs from the canonical rendering of the
    /// committed position.
    #[must_use]
    pub fn has_pending_edit(&self) -> bool {
        self.text != self.spec.format_position(self.committed)
    }

    /// The control moved. Re-derives the text; always succeeds.
    pub fn set_from_control(&mut self, new_position: i64) {
        self.position = self.spec.clamp_position(new_position);
        self.committed = self.position;
        let canonical = self.spec.format_position(self.position);
        self.replace_text(&canonical);
    }

    /// Move the control by `delta` steps.
    pub fn nudge(&mut self, delta: i64) {
        self.set_from_control(self.position.saturating_add(delta));
    }

    /// The text changed. Keeps the text exactly as typed and, when it parses,
    /// moves the live control position to match. The committed position
    /// waits for [`SyncedField::commit_text`].
    ///
    /// # Errors
    /// Returns `ParseError` for interim or invalid text (`""`, `"-"`, `"abc"`,
    /// `"inf"`); the position is unchanged.
    pub fn set_from_text(&mut self, raw_text: &str) -> Result<i64, ParseError> {
        self.replace_text(raw_text);

        let parsed = self.parse_text()?;
        self.position = self.spec.position_for(parsed);
        Ok(self.position)
    }

    /// Editing finished. Forces the control to the parsed value, which in
    /// turn renders the canonical text.
    ///
    /// # Errors
    /// Returns `ParseError` if the text does not parse; nothing changes.
    pub fn commit_text(&mut self) -> Result<i64, ParseError> {
        let parsed = self.parse_text()?;
        self.set_from_control(self.spec.position_for(parsed));
        Ok(self.position)
    }

    /// Back to the default position.
    pub fn reset(&mut self) {
        self.set_from_control(self.spec.default_position());
    }

    /// Swap in new text. The old buffer held clinical input and is wiped.
    fn replace_text(&mut self, new_text: &str) {
        self.text.zeroize();
        self.text.push_str(new_text);
    }

    fn parse_text(&self) -> Result<f64, ParseError> {
        self.text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(ParseError {
                field: self.spec.name(),
            })
    }
}
