use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListState, Paragraph},
};

use crate::{
    app::{AppState, TransactionsMode},
    filters::FilterField,
    ui::{
        components::{
            card::StatCard,
            money::{format_amount, styled_balance},
        },
        screens::dashboard::transaction_item,
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Filter bar + badges
            Constraint::Length(4), // Totals
            Constraint::Min(0),    // List
        ])
        .split(area);

    render_filters(frame, layout[0], state, &theme);

    let view = &state.transactions.view;
    if view.is_initial_load() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Loading transactions…",
                Style::default().fg(theme.dim),
            ))
            .alignment(Alignment::Center),
            layout[2],
        );
        return;
    }

    render_totals(frame, layout[1], state, &theme);
    render_list(frame, layout[2], state, &theme);
}

fn render_filters(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let tx = &state.transactions;
    let criteria = tx.view.criteria();
    let editing = tx.mode == TransactionsMode::Filter;

    let mut fields = Vec::new();
    for field in FilterField::ALL {
        let focused = editing && tx.focus == field;
        let value = match field {
            FilterField::Category => criteria
                .category_name
                .clone()
                .unwrap_or_else(|| "All".to_string()),
            FilterField::Type => criteria
                .kind
                .map(|k| k.label().to_string())
                .unwrap_or_else(|| "All".to_string()),
            FilterField::Start | FilterField::End if focused => format!("{}│", tx.date_input),
            FilterField::Start => criteria
                .start
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            FilterField::End => criteria
                .end
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        };
        let label_style = if focused {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        };
        fields.push(Span::styled(field.label(), label_style));
        fields.push(Span::raw(format!(": {value}   ")));
    }
    if tx.view.is_loading() {
        fields.push(Span::styled("loading…", Style::default().fg(theme.dim)));
    }

    let mut status = Vec::new();
    let badges = tx.view.badges();
    if badges.is_empty() {
        status.push(Span::styled(
            "No active filters",
            Style::default().fg(theme.dim),
        ));
    } else {
        for badge in badges {
            status.push(Span::styled(
                format!("[{}: {}]", badge.field.label(), badge.value),
                Style::default().fg(theme.warning),
            ));
            status.push(Span::raw(" "));
        }
    }
    if let Some(err) = tx.input_error.as_deref().or(tx.view.error()) {
        status.push(Span::raw("  "));
        status.push(Span::styled(err.to_string(), Style::default().fg(theme.error)));
    }

    let border = if editing {
        theme.border_focused
    } else {
        theme.border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title("Filters");
    frame.render_widget(
        Paragraph::new(vec![Line::from(fields), Line::from(status)]).block(block),
        area,
    );
}

fn render_totals(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let view = &state.transactions.view;
    let symbol = state.currency_symbol.as_str();
    let Some(totals) = view.totals() else {
        return;
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
        ])
        .split(area);

    StatCard::new(
        "Income",
        Span::styled(
            format_amount(totals.total_income, symbol),
            Style::default().fg(theme.positive),
        ),
        theme,
    )
    .badge(view.income_badge())
    .render(frame, cols[0]);
    StatCard::new(
        "Expenses",
        Span::styled(
            format_amount(totals.total_expenses, symbol),
            Style::default().fg(theme.negative),
        ),
        theme,
    )
    .render(frame, cols[1]);
    StatCard::new("Net", styled_balance(totals.net_amount, symbol, theme), theme)
        .render(frame, cols[2]);
    StatCard::new(
        "Count",
        Span::styled(
            totals.transaction_count.to_string(),
            Style::default().fg(theme.text),
        ),
        theme,
    )
    .render(frame, cols[3]);
}

fn render_list(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let tx = &state.transactions;
    let items = tx
        .view
        .transactions()
        .iter()
        .map(|t| transaction_item(t, &state.currency_symbol, theme))
        .collect::<Vec<_>>();

    let block = Block::default().borders(Borders::ALL).title("Transactions");
    if items.is_empty() {
        let message = if tx.view.has_active_filters() {
            "No transactions match these filters."
        } else {
            "No transactions yet."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(theme.dim))).block(block),
            area,
        );
        return;
    }

    let mut list_state = ListState::default();
    list_state.select(Some(tx.selected));
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, area, &mut list_state);
}
