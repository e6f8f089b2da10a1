use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::ui::theme::Theme;

/// One row of a modal form.
pub struct FormRow<'a> {
    pub label: &'a str,
    pub value: String,
    pub focused: bool,
    /// Selector rows show `‹ value ›` instead of a text cursor.
    pub selector: bool,
}

pub fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width.min(area.width)),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

/// Draws a form dialog over `area`; `error` and `footer` go below the rows.
pub fn render_form(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    rows: &[FormRow<'_>],
    error: Option<&str>,
    footer: &str,
    theme: &Theme,
) {
    let height = rows.len() as u16 + 5;
    let rect = centered_box(56, height, area);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border_focused));

    let mut lines: Vec<Line> = rows.iter().map(|row| form_line(row, theme)).collect();
    lines.push(Line::from(""));
    match error {
        Some(err) => lines.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(theme.error),
        ))),
        None => lines.push(Line::from(Span::styled(
            footer.to_string(),
            Style::default().fg(theme.dim),
        ))),
    }

    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

/// Small yes/no dialog.
pub fn render_confirm(frame: &mut Frame<'_>, area: Rect, message: &str, theme: &Theme) {
    let width = (message.chars().count() as u16 + 6).max(30);
    let rect = centered_box(width, 5, area);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .title(" confirm ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.warning));
    let lines = vec![
        Line::from(message.to_string()),
        Line::from(vec![
            Span::styled("y", Style::default().fg(theme.accent)),
            Span::raw(" yes   "),
            Span::styled("n", Style::default().fg(theme.accent)),
            Span::raw(" no"),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn form_line<'a>(row: &FormRow<'_>, theme: &Theme) -> Line<'a> {
    let label_style = if row.focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };
    let value = match (row.selector, row.focused) {
        (true, true) => format!("‹ {} ›", row.value),
        (true, false) => row.value.clone(),
        (false, true) => format!("{}│", row.value),
        (false, false) => row.value.clone(),
    };
    Line::from(vec![
        Span::styled(format!("{:<10}", row.label), label_style),
        Span::styled(value, Style::default().fg(theme.text)),
    ])
}
