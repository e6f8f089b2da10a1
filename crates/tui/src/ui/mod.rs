pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, DashboardMode, Screen, Section, TransactionsMode};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    match state.screen {
        Screen::Login => screens::login::render(frame, area, state),
        Screen::Home => render_shell(frame, area, state),
    }
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(2), // Tab bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    components::tabs::render_tabs(frame, layout[1], state.section, &theme);

    match state.section {
        Section::Dashboard => screens::dashboard::render(frame, layout[2], state),
        Section::Transactions => screens::transactions::render(frame, layout[2], state),
    }

    render_bottom_bar(frame, layout[3], state, &theme);
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let user = state
        .user
        .as_ref()
        .map(|u| u.name.clone().unwrap_or_else(|| u.email.clone()))
        .unwrap_or_else(|| "-".to_string());
    let refresh = state
        .last_refresh
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let line = Line::from(vec![
        Span::styled("Finance Tracker", Style::default().fg(theme.accent)),
        Span::raw("  "),
        Span::styled("User", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {user}  ")),
        Span::styled("Server", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled("Refresh", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {refresh}")),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let capturing = match state.section {
        Section::Dashboard => state.dashboard.mode != DashboardMode::View,
        Section::Transactions => state.transactions.mode != TransactionsMode::List,
    };

    let mut parts = Vec::new();
    if !capturing {
        parts.extend(components::tabs::tab_shortcuts(theme));
        parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
    }
    parts.extend(context_hints(state, theme));
    if !capturing {
        parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
        parts.push(key_hint("o", theme));
        parts.push(Span::raw(" logout  "));
        parts.push(key_hint("q", theme));
        parts.push(Span::raw(" quit"));
    }

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn key_hint(key: &str, theme: &Theme) -> Span<'static> {
    Span::styled(key.to_string(), Style::default().fg(theme.accent))
}

/// Keyboard hints for the current section and mode.
fn context_hints(state: &AppState, theme: &Theme) -> Vec<Span<'static>> {
    match state.section {
        Section::Dashboard => match state.dashboard.mode {
            DashboardMode::View => vec![
                key_hint("n", theme),
                Span::raw(" new tx  "),
                key_hint("c", theme),
                Span::raw(" new category  "),
                key_hint("e", theme),
                Span::raw(" edit  "),
                key_hint("x", theme),
                Span::raw(" delete  "),
                key_hint("m", theme),
                Span::raw(" month  "),
                key_hint("r", theme),
                Span::raw(" refresh"),
            ],
            DashboardMode::TransactionForm | DashboardMode::CategoryForm => vec![
                key_hint("Tab", theme),
                Span::raw(" next  "),
                key_hint("←/→", theme),
                Span::raw(" choose  "),
                key_hint("Enter", theme),
                Span::raw(" save  "),
                key_hint("Esc", theme),
                Span::raw(" cancel"),
            ],
            DashboardMode::ConfirmDelete => vec![
                key_hint("y", theme),
                Span::raw(" confirm  "),
                key_hint("n", theme),
                Span::raw(" cancel"),
            ],
        },
        Section::Transactions => match state.transactions.mode {
            TransactionsMode::List => {
                let mut hints = vec![
                    key_hint("/", theme),
                    Span::raw(" filters  "),
                    key_hint("r", theme),
                    Span::raw(" refresh  "),
                    key_hint("j/k", theme),
                    Span::raw(" move"),
                ];
                if state.transactions.view.has_active_filters() {
                    hints.push(Span::raw("  "));
                    hints.push(key_hint("c", theme));
                    hints.push(Span::raw(" clear filters"));
                }
                hints
            }
            TransactionsMode::Filter => vec![
                key_hint("Tab", theme),
                Span::raw(" next  "),
                key_hint("←/→", theme),
                Span::raw(" choose  "),
                key_hint("Enter", theme),
                Span::raw(" apply date  "),
                key_hint("Esc", theme),
                Span::raw(" done"),
            ],
        },
    }
}
