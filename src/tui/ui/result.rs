//! Prediction result panel and the blocking error notification.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::domain::Prediction;
use crate::tui::styles::ClinicTheme;

/// Last displayed prediction and the pending error notification, if any.
///
/// A failed prediction only sets `error`; the last result stays on screen.
#[derive(Debug, Clone, Default)]
pub struct ResultState {
    pub last: Option<Prediction>,
    pub error: Option<String>,
}

impl ResultState {
    pub fn show(&mut self, prediction: Prediction) {
        self.last = Some(prediction);
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.error.is_some()
    }
}

pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState, model_name: &str) {
    let block = Block::default()
        .title(Span::styled(" Result ", ClinicTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicTheme::border_focused());

    let content = match &state.last {
        None => vec![
            Line::from(Span::styled(
                "No prediction yet",
                ClinicTheme::text_secondary(),
            )),
            Line::from(Span::styled(
                "Adjust the measurements and press [P]",
                ClinicTheme::text_muted(),
            )),
        ],
        Some(prediction) => {
            let style = ClinicTheme::prediction(prediction.class);
            vec![
                Line::from(vec![
                    Span::styled("Prediction: ", ClinicTheme::text_secondary()),
                    Span::styled(prediction.class.label(), style),
                ]),
                Line::from(Span::styled(
                    prediction.class.description(),
                    ClinicTheme::text_secondary(),
                )),
                Line::from(Span::styled(
                    format!(
                        "{} · class {} · {}",
                        model_name,
                        prediction.class.class_id(),
                        prediction.predicted_at.format("%H:%M:%S UTC")
                    ),
                    ClinicTheme::text_muted(),
                )),
            ]
        }
    };

    let p = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(p, area);
}

/// Modal error box centered over `area`.
pub fn render_error_popup(f: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(60, 7, area);

    let content = Paragraph::new(vec![
        Line::from(Span::styled("! Error", ClinicTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), ClinicTheme::text())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Esc] ", ClinicTheme::key_hint()),
            Span::styled("Dismiss", ClinicTheme::key_desc()),
        ]),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(ClinicTheme::danger()),
    );

    f.render_widget(Clear, popup);
    f.render_widget(content, popup);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height + 2),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
