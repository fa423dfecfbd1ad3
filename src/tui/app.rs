//! Main TUI application state machine.
//!
//! Handles:
//! - Focus movement between rows
//! - Routing key presses to the control or text side of a field
//! - Prediction requests and the blocking error notification
//!
//! Everything runs on the event loop thread. A prediction runs to
//! completion before the next key is read.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use zeroize::Zeroizing;

use crate::application::InferencePipeline;
use crate::domain::{Gender, PredictionForm};
use crate::ports::Classifier;

use super::styles::ClinicTheme;
use super::ui::{
    form::{render_form, render_form_footer, FormViewState, GENDER_ROW},
    render_disclaimer,
    result::{render_error_popup, render_result, ResultState},
};

/// Steps moved by Shift+Left/Right.
const COARSE_STEP: i64 = 10;

/// Main application state
pub struct App {
    pipeline: InferencePipeline<dyn Classifier>,

    form: PredictionForm,

    view: FormViewState,

    result: ResultState,

    should_quit: bool,
}

impl App {
    /// Create the application with the default feature table.
    ///
    /// # Errors
    /// Returns error if the feature table is inconsistent.
    pub fn new(classifier: Arc<dyn Classifier>) -> Result<Self> {
        Ok(Self::with_form(classifier, PredictionForm::with_defaults()?))
    }

    /// Create the application around an already built form.
    #[must_use]
    pub fn with_form(classifier: Arc<dyn Classifier>, form: PredictionForm) -> Self {
        Self {
            pipeline: InferencePipeline::new(classifier),
            form,
            view: FormViewState::default(),
            result: ResultState::default(),
            should_quit: false,
        }
    }

    #[must_use]
    pub fn form(&self) -> &PredictionForm {
        &self.form
    }

    #[must_use]
    pub fn result(&self) -> &ResultState {
        &self.result
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    // Windows reports releases as well
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Form
                Constraint::Length(5), // Result
                Constraint::Length(2), // Footer
                Constraint::Length(2), // Disclaimer
            ])
            .split(f.area());

        let header = Paragraph::new(Line::from(vec![
            Span::styled(" ", ClinicTheme::text()),
            Span::styled("Diabetes Class Predictor", ClinicTheme::title()),
            Span::styled(
                format!(" │ {}", self.pipeline.classifier_name()),
                ClinicTheme::text_secondary(),
            ),
        ]))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(ClinicTheme::border()),
        );
        f.render_widget(header, chunks[0]);

        render_form(f, chunks[1], &self.form, &self.view);
        render_result(f, chunks[2], &self.result, self.pipeline.classifier_name());
        render_form_footer(f, chunks[3]);
        render_disclaimer(f, chunks[4]);

        if let Some(message) = &self.result.error {
            render_error_popup(f, f.area(), message);
        }
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // The error notification blocks the form until dismissed.
        if self.result.is_blocking() {
            if matches!(key, KeyCode::Esc | KeyCode::Enter) {
                self.result.dismiss_error();
            }
            return;
        }

        match key {
            KeyCode::Up | KeyCode::BackTab => {
                self.commit_selected();
                self.view.prev_row();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.commit_selected();
                self.view.next_row();
            }
            KeyCode::Left => self.slide(-1, modifiers),
            KeyCode::Right => self.slide(1, modifiers),
            KeyCode::Enter => self.commit_selected(),
            KeyCode::F(5) | KeyCode::Char('p') | KeyCode::Char('P') => self.predict(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.reset(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char(' ') if self.view.selected_row == GENDER_ROW => {
                self.form.set_gender(self.form.gender().toggled());
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => self.edit_text(|t| t.push(c)),
            KeyCode::Backspace => self.edit_text(|t| {
                t.pop();
            }),
            KeyCode::Delete => self.edit_text(String::clear),
            _ => {}
        }
    }

    fn slide(&mut self, direction: i64, modifiers: KeyModifiers) {
        match self.view.selected_feature() {
            None => {
                let gender = if direction < 0 { Gender::Male } else { Gender::Female };
                self.form.set_gender(gender);
            }
            Some(feature) => {
                let step = if modifiers.contains(KeyModifiers::SHIFT) {
                    COARSE_STEP
                } else {
                    1
                };
                self.form.field_mut(feature).nudge(direction * step);
            }
        }
    }

    fn edit_text<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut String),
    {
        let Some(feature) = self.view.selected_feature() else {
            return;
        };
        let field = self.form.field_mut(feature);
        let mut text = Zeroizing::new(field.text().to_string());
        edit(&mut *text);
        if field.set_from_text(&text).is_err() {
            tracing::trace!(field = feature.code(), "Interim entry does not parse; control unchanged");
        }
    }

    /// Editing finished on the focused field.
    fn commit_selected(&mut self) {
        let Some(feature) = self.view.selected_feature() else {
            return;
        };
        if let Err(e) = self.form.field_mut(feature).commit_text() {
            tracing::debug!("Commit ignored: {}", e);
        }
    }

    fn predict(&mut self) {
        match self.pipeline.predict_current_state(&self.form) {
            Ok(prediction) => self.result.show(prediction),
            Err(e) => {
                tracing::error!("Prediction failed: {}", e);
                self.result.fail(e.to_string());
            }
        }
    }

    fn reset(&mut self) {
        self.form.reset();
        self.view = FormViewState::default();
        tracing::info!("Form reset to defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClassifierError, ClinicalFeature, DiagnosticClass, FeatureVector};
    use std::sync::Mutex;

    /// Normal for the male category, fails for the female one.
    struct CategoryGate;

    impl Classifier for CategoryGate {
        fn classify(&self, vector: &FeatureVector) -> Result<i64, ClassifierError> {
            if vector.category() == 0.0 {
                Ok(0)
            } else {
                Err(ClassifierError::Failed("model rejected input".into()))
            }
        }

        fn name(&self) -> &str {
            "gate"
        }
    }

    /// Records the AGE column of every vector it classifies.
    #[derive(Default)]
    struct AgeRecorder {
        seen: Mutex<Vec<f64>>,
    }

    impl AgeRecorder {
        fn ages(&self) -> Vec<f64> {
            self.seen
                .lock()
                .expect("lock")
                .iter()
                .map(|v| v.exp_m1())
                .collect()
        }
    }

    impl Classifier for AgeRecorder {
        fn classify(&self, vector: &FeatureVector) -> Result<i64, ClassifierError> {
            self.seen
                .lock()
                .expect("lock")
                .push(vector.get(ClinicalFeature::Age));
            Ok(0)
        }
    }

    fn app() -> App {
        App::new(Arc::new(CategoryGate)).expect("app")
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_moves_control_and_leaving_commits() {
        let mut app = app();
        press(&mut app, KeyCode::Down); // AGE
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.form().field(ClinicalFeature::Age).position(), 55);

        type_str(&mut app, "62");
        let age = app.form().field(ClinicalFeature::Age);
        assert_eq!(age.position(), 62);
        assert_eq!(age.committed_position(), 55);
        assert_eq!(age.text(), "62");

        press(&mut app, KeyCode::Down);
        assert_eq!(app.form().field(ClinicalFeature::Age).text(), "62.0");
    }

    #[test]
    fn test_predict_mid_edit_uses_committed_value() {
        let recorder = Arc::new(AgeRecorder::default());
        let mut app = App::new(recorder.clone()).expect("app");
        press(&mut app, KeyCode::Down); // AGE
        press(&mut app, KeyCode::Delete);
        type_str(&mut app, "6");
        press(&mut app, KeyCode::Char('p'));

        type_str(&mut app, "2");
        press(&mut app, KeyCode::F(5));

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('p'));

        let ages = recorder.ages();
        assert_eq!(ages.len(), 3);
        assert!((ages[0] - 55.0).abs() < 1e-9, "saw {}", ages[0]);
        assert!((ages[1] - 55.0).abs() < 1e-9, "saw {}", ages[1]);
        assert!((ages[2] - 62.0).abs() < 1e-9, "saw {}", ages[2]);
    }

    #[test]
    fn test_arrow_keys_slide_the_control() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down); // Urea
        press(&mut app, KeyCode::Right);
        assert_eq!(app.form().field(ClinicalFeature::Urea).text(), "4.7");

        app.handle_key(KeyCode::Left, KeyModifiers::SHIFT);
        assert_eq!(app.form().field(ClinicalFeature::Urea).position(), 37);
        assert_eq!(app.form().field(ClinicalFeature::Urea).text(), "3.7");
    }

    #[test]
    fn test_gender_row_toggles() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.form().gender(), Gender::Female);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.form().gender(), Gender::Male);
        // digits on the gender row are ignored
        type_str(&mut app, "1");
        assert_eq!(app.form().gender(), Gender::Male);
    }

    #[test]
    fn test_failed_prediction_blocks_and_keeps_previous_result() {
        let mut app = app();
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(
            app.result().last.map(|p| p.class),
            Some(DiagnosticClass::Normal)
        );

        press(&mut app, KeyCode::Char(' ')); // Female
        press(&mut app, KeyCode::F(5));
        assert!(app.result().is_blocking());
        assert_eq!(
            app.result().last.map(|p| p.class),
            Some(DiagnosticClass::Normal)
        );

        // blocked: the toggle is swallowed
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.form().gender(), Gender::Female);

        press(&mut app, KeyCode::Esc);
        assert!(!app.result().is_blocking());
    }

    #[test]
    fn test_reset_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.form().field(ClinicalFeature::Age).position(), 55);

        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit());
    }
}
