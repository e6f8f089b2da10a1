use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, LoginField, LoginMode},
    ui::{components::modal::centered_box, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let login = &state.login;

    let fields: &[LoginField] = match login.mode {
        LoginMode::Login => &[LoginField::Email, LoginField::Password],
        LoginMode::Register => &[LoginField::Name, LoginField::Email, LoginField::Password],
    };
    let title = match login.mode {
        LoginMode::Login => " login ",
        LoginMode::Register => " create account ",
    };

    let box_height = fields.len() as u16 * 2 + 3;
    let card_area = centered_box(44, box_height, area);
    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(2); fields.len()])
        .margin(1)
        .split(inner);

    for (row, field) in rows.iter().zip(fields) {
        let (label, value) = match field {
            LoginField::Name => ("Name", login.name.clone()),
            LoginField::Email => ("Email", login.email.clone()),
            LoginField::Password => ("Password", mask_password(&login.password)),
        };
        render_input(frame, *row, label, &value, login.focus == *field, &theme);
    }

    let below = |offset: u16| Rect {
        x: card_area.x,
        y: card_area.y.saturating_add(card_area.height + offset),
        width: card_area.width,
        height: 1,
    };

    if login.pending {
        let working = match login.mode {
            LoginMode::Login => "Signing in…",
            LoginMode::Register => "Creating account…",
        };
        frame.render_widget(
            Paragraph::new(Span::styled(working, Style::default().fg(theme.dim)))
                .alignment(Alignment::Center),
            below(1),
        );
    } else if let Some(message) = &login.message {
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            ))
            .alignment(Alignment::Center),
            below(1),
        );
    }

    let toggle = match login.mode {
        LoginMode::Login => " create an account",
        LoginMode::Register => " back to login",
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Ctrl+R", Style::default().fg(theme.accent)),
            Span::styled(toggle, Style::default().fg(theme.dim)),
            Span::styled("   Esc", Style::default().fg(theme.accent)),
            Span::styled(" quit", Style::default().fg(theme.dim)),
        ]))
        .alignment(Alignment::Center),
        below(2),
    );
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    theme: &Theme,
) {
    let cursor = if focused { "│" } else { "" };
    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };

    let line = Line::from(vec![
        Span::styled(
            format!("{label:<10}"),
            style.add_modifier(Modifier::DIM),
        ),
        Span::styled(format!("{value}{cursor}"), style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// One bullet per character.
fn mask_password(password: &str) -> String {
    "•".repeat(password.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_counts_characters_not_bytes() {
        assert_eq!(mask_password(""), "");
        assert_eq!(mask_password("pä55"), "••••");
    }
}
