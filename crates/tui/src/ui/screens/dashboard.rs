use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use api_types::transaction::{Transaction, TransactionType};

use crate::{
    app::{AppState, DashboardMode},
    forms::{CategoryFormField, TransactionFormField},
    ui::{
        components::{
            card::{Card, StatCard},
            modal::{self, FormRow},
            money::{format_amount, styled_balance, styled_signed_amount},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let dashboard = &state.dashboard;

    if dashboard.is_initial_load() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Loading your finances…",
                Style::default().fg(theme.dim),
            ))
            .alignment(Alignment::Center),
            area,
        );
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status
            Constraint::Length(4), // Summary cards
            Constraint::Min(5),    // Recent transactions + categories
        ])
        .split(area);

    render_status(frame, layout[0], state, &theme);
    render_summary(frame, layout[1], state, &theme);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(layout[2]);
    render_recent_transactions(frame, cols[0], state, &theme);
    render_categories(frame, cols[1], state, &theme);

    match dashboard.mode {
        DashboardMode::View => {}
        DashboardMode::TransactionForm => render_transaction_form(frame, area, state, &theme),
        DashboardMode::CategoryForm => render_category_form(frame, area, state, &theme),
        DashboardMode::ConfirmDelete => {
            if let Some(category) = dashboard.selected_category() {
                let message = format!("Delete category \"{}\"?", category.name);
                modal::render_confirm(frame, area, &message, &theme);
            }
        }
    }
}

fn render_status(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let dashboard = &state.dashboard;
    let scope = if dashboard.month_scope {
        "This month"
    } else {
        "All time"
    };
    let mut spans = vec![
        Span::styled("Summary", Style::default().fg(theme.dim)),
        Span::raw(format!(": {scope}")),
    ];
    if dashboard.pending_load || dashboard.refresh_requested {
        spans.push(Span::styled("   refreshing…", Style::default().fg(theme.dim)));
    }
    if dashboard.saving {
        spans.push(Span::styled("   saving…", Style::default().fg(theme.dim)));
    }
    if let Some(err) = &dashboard.error {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(err.as_str(), Style::default().fg(theme.error)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_summary(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let symbol = state.currency_symbol.as_str();
    let summary = state.dashboard.summary.clone().unwrap_or_default();

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    StatCard::new(
        "Total Income",
        Span::styled(
            format_amount(summary.total_income, symbol),
            Style::default().fg(theme.positive),
        ),
        theme,
    )
    .render(frame, cols[0]);
    StatCard::new(
        "Total Expense",
        Span::styled(
            format_amount(summary.total_expense, symbol),
            Style::default().fg(theme.negative),
        ),
        theme,
    )
    .render(frame, cols[1]);
    StatCard::new("Balance", styled_balance(summary.balance, symbol, theme), theme)
        .render(frame, cols[2]);
}

fn render_recent_transactions(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let card = Card::new("Recent Transactions", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let recent = state.dashboard.recent_transactions();
    if recent.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No transactions yet. Press n to add one.",
                Style::default().fg(theme.dim),
            )),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = recent
        .iter()
        .map(|tx| transaction_item(tx, &state.currency_symbol, theme))
        .collect();
    frame.render_widget(List::new(items), inner);
}

/// One row shared by the dashboard and the transactions screen.
pub fn transaction_item(tx: &Transaction, symbol: &str, theme: &Theme) -> ListItem<'static> {
    let (marker, marker_color) = match tx.kind {
        TransactionType::Income => ("▲", theme.positive),
        TransactionType::Expense => ("▼", theme.negative),
    };
    let category = tx.category_name().unwrap_or("Uncategorized").to_string();
    let title = tx
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "No description".to_string());

    ListItem::new(Line::from(vec![
        Span::styled(format!("{marker} "), Style::default().fg(marker_color)),
        Span::styled(
            tx.date.format("%d %b %Y").to_string(),
            Style::default().fg(theme.dim),
        ),
        Span::raw("  "),
        Span::styled(format!("{category:<14}"), Style::default().fg(theme.accent)),
        Span::styled(format!("{title:<24}"), Style::default().fg(theme.text_muted)),
        styled_signed_amount(tx.signed_amount(), symbol, theme),
    ]))
}

fn render_categories(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let dashboard = &state.dashboard;
    let card = Card::new("Categories", theme).focused(dashboard.mode == DashboardMode::View);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if dashboard.categories.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No categories. Press c to create one.",
                Style::default().fg(theme.dim),
            )),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = dashboard
        .categories
        .iter()
        .map(|category| {
            let mut spans = vec![Span::styled(
                category.name.clone(),
                Style::default().fg(theme.text),
            )];
            if let Some(desc) = category.description.as_deref().filter(|d| !d.is_empty()) {
                spans.push(Span::styled(
                    format!("  {desc}"),
                    Style::default().fg(theme.dim),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(dashboard.selected_category));
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, inner, &mut list_state);
}

fn render_transaction_form(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let form = &state.dashboard.tx_form;
    let row = |field: TransactionFormField, value: String, selector: bool| FormRow {
        label: field.label(),
        value,
        focused: form.focus == field,
        selector,
    };
    let rows = [
        row(TransactionFormField::Amount, form.amount.clone(), false),
        row(TransactionFormField::Type, form.kind.label().to_string(), true),
        row(TransactionFormField::Date, form.date.clone(), false),
        row(TransactionFormField::Title, form.title.clone(), false),
        row(
            TransactionFormField::Category,
            form.category
                .clone()
                .unwrap_or_else(|| "(select)".to_string()),
            true,
        ),
    ];
    modal::render_form(
        frame,
        area,
        "add transaction",
        &rows,
        form.error.as_deref(),
        "Date as YYYY-MM-DD",
        theme,
    );
}

fn render_category_form(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let form = &state.dashboard.category_form;
    let title = match &form.editing {
        Some(_) => "edit category",
        None => "add category",
    };
    let rows = [
        FormRow {
            label: "Name",
            value: form.name.clone(),
            focused: form.focus == CategoryFormField::Name,
            selector: false,
        },
        FormRow {
            label: "Notes",
            value: form.description.clone(),
            focused: form.focus == CategoryFormField::Description,
            selector: false,
        },
    ];
    modal::render_form(
        frame,
        area,
        title,
        &rows,
        form.error.as_deref(),
        "Description is optional",
        theme,
    );
}
