//! Input form: gender selector plus one slider/text pair per feature.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::{ClinicalFeature, Gender, PredictionForm, SyncedField, FEATURE_ORDER};
use crate::tui::styles::ClinicTheme;

/// Row 0 is the gender selector, rows 1.. follow `FEATURE_ORDER`.
pub const GENDER_ROW: usize = 0;
pub const ROW_COUNT: usize = FEATURE_ORDER.len() + 1;

/// Which row has keyboard focus.
#[derive(Debug, Clone, Default)]
pub struct FormViewState {
    pub selected_row: usize,
}

impl FormViewState {
    pub fn next_row(&mut self) {
        self.selected_row = (self.selected_row + 1) % ROW_COUNT;
    }

    pub fn prev_row(&mut self) {
        if self.selected_row == 0 {
            self.selected_row = ROW_COUNT - 1;
        } else {
            self.selected_row -= 1;
        }
    }

    /// Feature on the focused row, `None` on the gender row.
    #[must_use]
    pub fn selected_feature(&self) -> Option<ClinicalFeature> {
        self.selected_row
            .checked_sub(1)
            .and_then(|i| FEATURE_ORDER.get(i).copied())
    }
}

pub fn render_form(f: &mut Frame, area: Rect, form: &PredictionForm, view: &FormViewState) {
    let block = Block::default()
        .title(Span::styled(" Clinical Measurements ", ClinicTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let constraints: Vec<Constraint> = (0..ROW_COUNT)
        .map(|_| Constraint::Length(2))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(inner);

    render_gender_row(f, rows[GENDER_ROW], form.gender(), view.selected_row == GENDER_ROW);
    for (i, field) in form.fields().iter().enumerate() {
        let row = i + 1;
        render_field_row(f, rows[row], field, view.selected_row == row);
    }
}

fn row_label(label: &str, focused: bool) -> Paragraph<'static> {
    let style = if focused {
        ClinicTheme::focused()
    } else {
        ClinicTheme::text_secondary()
    };
    let marker = if focused { "▶ " } else { "  " };
    Paragraph::new(Line::from(vec![
        Span::styled(marker, ClinicTheme::focused()),
        Span::styled(label.to_string(), style),
    ]))
}

fn render_gender_row(f: &mut Frame, area: Rect, gender: Gender, focused: bool) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(area);

    f.render_widget(row_label("Gender", focused), cols[0]);

    let option = |g: Gender| {
        let (mark, style) = if g == gender {
            ("(•) ", ClinicTheme::text())
        } else {
            ("( ) ", ClinicTheme::text_muted())
        };
        vec![
            Span::styled(mark, style),
            Span::styled(format!("{}   ", g.label()), style),
        ]
    };
    let mut spans = option(Gender::Male);
    spans.extend(option(Gender::Female));
    f.render_widget(Paragraph::new(Line::from(spans)), cols[1]);
}

fn render_field_row(f: &mut Frame, area: Rect, field: &SyncedField, focused: bool) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(10), // label
            Constraint::Min(12),    // slider
            Constraint::Length(12), // text entry
            Constraint::Length(9),  // unit
        ])
        .split(area);

    f.render_widget(row_label(field.feature().code(), focused), cols[0]);

    let spec = field.spec();
    let slider = Gauge::default()
        .gauge_style(ClinicTheme::slider(focused))
        .ratio(field.ratio())
        .label(Span::styled(
            format!("{:.1} ─ {:.1}", spec.min_value, spec.max_value),
            ClinicTheme::text_muted(),
        ));
    f.render_widget(slider, Rect { height: 1, ..cols[1] });

    let text_style = if field.has_pending_edit() {
        ClinicTheme::warning()
    } else {
        ClinicTheme::text()
    };
    let mut entry = vec![Span::raw(" "), Span::styled(field.text().to_string(), text_style)];
    if focused {
        entry.push(Span::styled("▌", ClinicTheme::focused()));
    }
    if field.has_pending_edit() {
        entry.push(Span::styled(" *", ClinicTheme::warning()));
    }
    f.render_widget(Paragraph::new(Line::from(entry)), cols[2]);

    f.render_widget(
        Paragraph::new(Span::styled(
            format!(" {}", field.feature().unit()),
            ClinicTheme::text_muted(),
        )),
        cols[3],
    );
}

/// Key hints shown under the form.
pub fn render_form_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[↑↓] ", ClinicTheme::key_hint()),
        Span::styled("Field ", ClinicTheme::key_desc()),
        Span::styled("[←→] ", ClinicTheme::key_hint()),
        Span::styled("Slide ", ClinicTheme::key_desc()),
        Span::styled("[0-9.-] ", ClinicTheme::key_hint()),
        Span::styled("Type ", ClinicTheme::key_desc()),
        Span::styled("[Enter] ", ClinicTheme::key_hint()),
        Span::styled("Commit ", ClinicTheme::key_desc()),
        Span::styled("[P] ", ClinicTheme::key_hint()),
        Span::styled("Predict ", ClinicTheme::key_desc()),
        Span::styled("[R] ", ClinicTheme::key_hint()),
        Span::styled("Reset ", ClinicTheme::key_desc()),
        Span::styled("[Q] ", ClinicTheme::key_hint()),
        Span::styled("Quit", ClinicTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_navigation_wraps() {
        let mut view = FormViewState::default();
        assert_eq!(view.selected_feature(), None);

        view.next_row();
        assert_eq!(view.selected_feature(), Some(ClinicalFeature::Age));

        view.prev_row();
        view.prev_row();
        assert_eq!(view.selected_row, ROW_COUNT - 1);
        assert_eq!(view.selected_feature(), Some(ClinicalFeature::Bmi));

        view.next_row();
        assert_eq!(view.selected_row, GENDER_ROW);
    }
}
