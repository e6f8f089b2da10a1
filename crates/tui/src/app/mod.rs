use std::{
    future::Future,
    time::{Duration, Instant},
};

use api_types::{
    category::Category,
    dashboard::DashboardSummary,
    transaction::{FilteredTransactions, Transaction, TransactionType},
};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use crossterm::event::{self, Event, KeyEvent};
use tokio::sync::mpsc;

use crate::{
    client::{Client, ClientError, SessionToken},
    config::AppConfig,
    error::{AppError, Result},
    filters::{FetchTicket, FilterChange, FilterField, FilterViewModel},
    forms::{self, CategoryForm, TransactionForm, TransactionFormField},
    session::{AuthOutcome, AuthSession, TokenStore, UserIdentity},
    ui::{self, keymap::AppAction},
};

const TOAST_TTL: Duration = Duration::from_secs(4);
const RECENT_TRANSACTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Transactions,
}

impl Section {
    pub const ALL: [Section; 2] = [Self::Dashboard, Self::Transactions];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Transactions => "Transactions",
        }
    }

    pub fn shortcut(self) -> char {
        match self {
            Self::Dashboard => 'd',
            Self::Transactions => 't',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Name,
    Email,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub mode: LoginMode,
    pub name: String,
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
    /// A login or register request is in flight.
    pub pending: bool,
}

impl LoginState {
    fn new(email: String) -> Self {
        Self {
            mode: LoginMode::Login,
            name: String::new(),
            email,
            password: String::new(),
            focus: LoginField::Email,
            message: None,
            pending: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardMode {
    View,
    TransactionForm,
    CategoryForm,
    ConfirmDelete,
}

#[derive(Debug)]
pub struct DashboardState {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub summary: Option<DashboardSummary>,
    pub loaded: bool,
    /// Picked up by the event loop on its next tick.
    pub refresh_requested: bool,
    /// A snapshot load is in flight.
    pub pending_load: bool,
    /// Only the response to this load is applied.
    pub load_seq: u64,
    /// A create, update or delete is in flight.
    pub saving: bool,
    pub error: Option<String>,
    pub mode: DashboardMode,
    pub tx_form: TransactionForm,
    pub category_form: CategoryForm,
    pub selected_category: usize,
    /// Summary scoped to the current month instead of all time.
    pub month_scope: bool,
}

impl DashboardState {
    fn new(today: NaiveDate) -> Self {
        Self {
            transactions: Vec::new(),
            categories: Vec::new(),
            summary: None,
            loaded: false,
            refresh_requested: false,
            pending_load: false,
            load_seq: 0,
            saving: false,
            error: None,
            mode: DashboardMode::View,
            tx_form: TransactionForm::new(today),
            category_form: CategoryForm::default(),
            selected_category: 0,
            month_scope: false,
        }
    }

    pub fn recent_transactions(&self) -> &[Transaction] {
        let end = self.transactions.len().min(RECENT_TRANSACTIONS);
        &self.transactions[..end]
    }

    pub fn selected_category(&self) -> Option<&Category> {
        self.categories.get(self.selected_category)
    }

    pub fn is_initial_load(&self) -> bool {
        (self.refresh_requested || self.pending_load) && !self.loaded
    }

    fn select_next(&mut self) {
        if self.categories.is_empty() {
            return;
        }
        self.selected_category = (self.selected_category + 1).min(self.categories.len() - 1);
    }

    fn select_prev(&mut self) {
        self.selected_category = self.selected_category.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionsMode {
    List,
    Filter,
}

#[derive(Debug)]
pub struct TransactionsState {
    pub view: FilterViewModel,
    pub mode: TransactionsMode,
    pub focus: FilterField,
    /// Uncommitted text for the focused date field.
    pub date_input: String,
    pub input_error: Option<String>,
    pub selected: usize,
}

impl Default for TransactionsState {
    fn default() -> Self {
        Self {
            view: FilterViewModel::new(),
            mode: TransactionsMode::List,
            focus: FilterField::Category,
            date_input: String::new(),
            input_error: None,
            selected: 0,
        }
    }
}

impl TransactionsState {
    fn select_next(&mut self) {
        let len = self.view.transactions().len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn focus_field(&mut self, field: FilterField) {
        self.focus = field;
        self.input_error = None;
        let criteria = self.view.criteria();
        let date = match field {
            FilterField::Start => criteria.start,
            FilterField::End => criteria.end,
            FilterField::Category | FilterField::Type => None,
        };
        self.date_input = date
            .map(|d| d.format(forms::DATE_FORMAT).to_string())
            .unwrap_or_default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    expires_at: Instant,
}

type ApiResult<T> = std::result::Result<T, ClientError>;

/// Everything the dashboard shows, fetched together.
#[derive(Debug)]
pub struct DashboardSnapshot {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub summary: DashboardSummary,
}

/// Results of background requests, delivered back to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// Carries the session that ran the request; it replaces the app's own
    /// on success.
    Authenticated {
        outcome: AuthOutcome,
        session: AuthSession,
    },
    DashboardLoaded {
        seq: u64,
        result: ApiResult<DashboardSnapshot>,
    },
    TransactionSaved {
        result: ApiResult<()>,
    },
    CategorySaved {
        name: String,
        updated: bool,
        result: ApiResult<()>,
    },
    CategoryDeleted {
        name: String,
        result: ApiResult<()>,
    },
    Filtered {
        seq: u64,
        result: ApiResult<FilteredTransactions>,
    },
}

/// A background result tagged with the session generation that issued it.
/// Login and logout bump the generation, so nothing requested by a previous
/// session can land in the current one.
#[derive(Debug)]
pub struct AppMessage {
    pub generation: u64,
    pub event: AppEvent,
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub section: Section,
    pub login: LoginState,
    pub user: Option<UserIdentity>,
    pub dashboard: DashboardState,
    pub transactions: TransactionsState,
    pub toast: Option<ToastState>,
    pub last_refresh: Option<DateTime<Tz>>,
    pub currency_symbol: String,
    pub base_url: String,
}

pub struct App {
    config: AppConfig,
    session: AuthSession,
    pub state: AppState,
    generation: u64,
    events_tx: mpsc::UnboundedSender<AppMessage>,
    events_rx: mpsc::UnboundedReceiver<AppMessage>,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url, SessionToken::new())?;
        let mut session = AuthSession::new(client, TokenStore::new(config.state_path.clone()));
        let restored = session.restore();

        let today = config.today();
        let mut state = AppState {
            screen: Screen::Login,
            section: Section::Dashboard,
            login: LoginState::new(config.email.clone()),
            user: session.user().cloned(),
            dashboard: DashboardState::new(today),
            transactions: TransactionsState::default(),
            toast: None,
            last_refresh: None,
            currency_symbol: config.currency_symbol.clone(),
            base_url: config.base_url.clone(),
        };
        if restored {
            state.screen = Screen::Home;
            state.dashboard.refresh_requested = true;
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            config,
            session,
            state,
            generation: 0,
            events_tx,
            events_rx,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        ui::restore_terminal(&mut terminal)?;
        result
    }

    /// Requests never run on this loop; they are spawned and report back
    /// through the channel, so input stays live while the backend stalls.
    fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(100);

        while !self.should_quit {
            self.drain_events();
            self.expire_toast();
            if self.state.screen == Screen::Home && self.state.dashboard.refresh_requested {
                self.spawn_dashboard_load();
            }

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }

        Ok(())
    }

    fn drain_events(&mut self) {
        while let Ok(message) = self.events_rx.try_recv() {
            self.handle_event(message);
        }
    }

    pub fn handle_event(&mut self, message: AppMessage) {
        if message.generation != self.generation {
            tracing::debug!(
                "dropping response from session {} (current {})",
                message.generation,
                self.generation
            );
            return;
        }

        match message.event {
            AppEvent::Authenticated { outcome, session } => self.finish_auth(outcome, session),
            AppEvent::DashboardLoaded { seq, result } => self.apply_dashboard(seq, result),
            AppEvent::TransactionSaved { result } => self.finish_transaction_save(result),
            AppEvent::CategorySaved {
                name,
                updated,
                result,
            } => self.finish_category_save(&name, updated, result),
            AppEvent::CategoryDeleted { name, result } => {
                self.finish_category_delete(&name, result)
            }
            AppEvent::Filtered { seq, result } => {
                let tx = &mut self.state.transactions;
                tx.view.complete(seq, result);
                let len = tx.view.transactions().len();
                tx.selected = tx.selected.min(len.saturating_sub(1));
            }
        }
    }

    /// Runs `request` on the runtime and posts its event back to the loop.
    fn spawn_request(&self, request: impl Future<Output = AppEvent> + Send + 'static) {
        let events = self.events_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let event = request.await;
            if events.send(AppMessage { generation, event }).is_err() {
                tracing::debug!("app closed before a background response was delivered");
            }
        });
    }

    fn expire_toast(&mut self) {
        if self
            .state
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= Instant::now())
        {
            self.state.toast = None;
        }
    }

    fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.state.toast = Some(ToastState {
            message: message.into(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let action = ui::keymap::map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }

        match self.state.screen {
            Screen::Login => self.handle_login_key(action),
            Screen::Home => match self.state.section {
                Section::Dashboard => self.handle_dashboard_key(action),
                Section::Transactions => self.handle_transactions_key(action),
            },
        }
    }

    /// Shared shortcuts for screens that are not capturing text input.
    fn handle_global_char(&mut self, ch: char) -> bool {
        match ch {
            'q' | 'Q' => self.should_quit = true,
            'o' | 'O' => self.logout(),
            'd' | 'D' => self.state.section = Section::Dashboard,
            't' | 'T' => self.open_transactions(),
            _ => return false,
        }
        true
    }

    fn handle_login_key(&mut self, action: AppAction) {
        match action {
            AppAction::NextField => self.advance_login_focus(),
            AppAction::ToggleMode => {
                let login = &mut self.state.login;
                login.mode = match login.mode {
                    LoginMode::Login => LoginMode::Register,
                    LoginMode::Register => LoginMode::Login,
                };
                login.focus = match login.mode {
                    LoginMode::Login => LoginField::Email,
                    LoginMode::Register => LoginField::Name,
                };
                login.message = None;
            }
            AppAction::Submit => self.attempt_auth(),
            AppAction::Backspace => {
                self.active_login_field_mut().pop();
            }
            AppAction::Input(ch) => self.active_login_field_mut().push(ch),
            AppAction::Cancel => self.should_quit = true,
            _ => {}
        }
    }

    fn advance_login_focus(&mut self) {
        let login = &mut self.state.login;
        login.focus = match (login.mode, login.focus) {
            (LoginMode::Register, LoginField::Name) => LoginField::Email,
            (_, LoginField::Email) => LoginField::Password,
            (LoginMode::Register, LoginField::Password) => LoginField::Name,
            (LoginMode::Login, _) => LoginField::Email,
        };
    }

    fn active_login_field_mut(&mut self) -> &mut String {
        let login = &mut self.state.login;
        match login.focus {
            LoginField::Name => &mut login.name,
            LoginField::Email => &mut login.email,
            LoginField::Password => &mut login.password,
        }
    }

    fn attempt_auth(&mut self) {
        let login = &mut self.state.login;
        if login.pending {
            return;
        }
        login.pending = true;
        login.message = None;

        let mode = login.mode;
        let name = login.name.clone();
        let email = login.email.clone();
        let password = login.password.clone();
        let mut session = self.session.clone();
        self.spawn_request(async move {
            let outcome = match mode {
                LoginMode::Login => session.login(&email, &password).await,
                LoginMode::Register => session.register(&name, &email, &password).await,
            };
            AppEvent::Authenticated { outcome, session }
        });
    }

    fn finish_auth(&mut self, outcome: AuthOutcome, session: AuthSession) {
        self.state.login.pending = false;
        match outcome {
            AuthOutcome::Success => {
                self.session = session;
                self.enter_home();
            }
            AuthOutcome::Failure(message) => {
                self.state.login.message = Some(message);
            }
        }
    }

    /// Starts a fresh session view; anything still in flight is orphaned.
    fn enter_home(&mut self) {
        self.generation += 1;
        let login = &mut self.state.login;
        login.message = None;
        login.password.clear();
        self.state.user = self.session.user().cloned();
        self.state.screen = Screen::Home;
        self.state.section = Section::Dashboard;
        self.state.dashboard = DashboardState::new(self.config.today());
        self.state.dashboard.refresh_requested = true;
        self.state.transactions = TransactionsState::default();
    }

    fn logout(&mut self) {
        self.generation += 1;
        self.session.logout();
        let email = self.state.login.email.clone();
        self.state.login = LoginState::new(email);
        self.state.user = None;
        self.state.screen = Screen::Login;
        self.state.section = Section::Dashboard;
        self.state.dashboard = DashboardState::new(self.config.today());
        self.state.transactions = TransactionsState::default();
        self.state.last_refresh = None;
    }

    fn spawn_dashboard_load(&mut self) {
        let dashboard = &mut self.state.dashboard;
        dashboard.refresh_requested = false;
        dashboard.pending_load = true;
        dashboard.load_seq += 1;
        let seq = dashboard.load_seq;
        let month = dashboard.month_scope.then(|| self.config.today());

        let client = self.session.client().clone();
        self.spawn_request(async move {
            let result = tokio::try_join!(
                client.transactions_list_all(),
                client.categories_list(),
                client.dashboard_summary(month),
            )
            .map(|(transactions, categories, summary)| DashboardSnapshot {
                transactions,
                categories,
                summary,
            });
            AppEvent::DashboardLoaded { seq, result }
        });
    }

    fn apply_dashboard(&mut self, seq: u64, result: ApiResult<DashboardSnapshot>) {
        let dashboard = &mut self.state.dashboard;
        if seq != dashboard.load_seq {
            tracing::debug!("dropping stale dashboard load {seq} (latest {})", dashboard.load_seq);
            return;
        }

        dashboard.pending_load = false;
        dashboard.loaded = true;
        match result {
            Ok(snapshot) => {
                dashboard.transactions = snapshot.transactions;
                dashboard.categories = snapshot.categories;
                dashboard.summary = Some(snapshot.summary);
                dashboard.error = None;
                dashboard.selected_category = dashboard
                    .selected_category
                    .min(dashboard.categories.len().saturating_sub(1));
                self.state.last_refresh = Some(chrono::Utc::now().with_timezone(&self.config.tz()));
            }
            Err(err) => {
                tracing::warn!("dashboard load failed: {err}");
                dashboard.error = Some(err.user_message());
            }
        }
    }

    fn handle_dashboard_key(&mut self, action: AppAction) {
        match self.state.dashboard.mode {
            DashboardMode::View => self.handle_dashboard_view_key(action),
            DashboardMode::TransactionForm => self.handle_transaction_form_key(action),
            DashboardMode::CategoryForm => self.handle_category_form_key(action),
            DashboardMode::ConfirmDelete => self.handle_confirm_delete_key(action),
        }
    }

    fn handle_dashboard_view_key(&mut self, action: AppAction) {
        let dashboard = &mut self.state.dashboard;
        match action {
            AppAction::Up => dashboard.select_prev(),
            AppAction::Down => dashboard.select_next(),
            AppAction::Input(ch) => {
                if self.handle_global_char(ch) {
                    return;
                }
                let dashboard = &mut self.state.dashboard;
                match ch {
                    'j' | 'J' => dashboard.select_next(),
                    'k' | 'K' => dashboard.select_prev(),
                    'r' | 'R' => dashboard.refresh_requested = true,
                    'm' | 'M' => {
                        dashboard.month_scope = !dashboard.month_scope;
                        dashboard.refresh_requested = true;
                        let scope = if dashboard.month_scope {
                            "Summary: this month"
                        } else {
                            "Summary: all time"
                        };
                        self.toast(ToastLevel::Info, scope);
                    }
                    'n' | 'N' => {
                        dashboard.tx_form = TransactionForm::new(self.config.today());
                        dashboard.mode = DashboardMode::TransactionForm;
                    }
                    'c' | 'C' => {
                        dashboard.category_form = CategoryForm::default();
                        dashboard.mode = DashboardMode::CategoryForm;
                    }
                    'e' | 'E' => {
                        if let Some(form) = dashboard.selected_category().map(CategoryForm::edit) {
                            dashboard.category_form = form;
                            dashboard.mode = DashboardMode::CategoryForm;
                        }
                    }
                    'x' | 'X' => {
                        if dashboard.selected_category().is_some() {
                            dashboard.mode = DashboardMode::ConfirmDelete;
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn handle_transaction_form_key(&mut self, action: AppAction) {
        let dashboard = &mut self.state.dashboard;
        let form = &mut dashboard.tx_form;
        match action {
            AppAction::Cancel => dashboard.mode = DashboardMode::View,
            AppAction::NextField => form.advance_focus(),
            AppAction::Left | AppAction::Right => {
                form.cycle(&dashboard.categories, action == AppAction::Right);
            }
            AppAction::Backspace => {
                if let Some(field) = form.active_text_mut() {
                    field.pop();
                }
            }
            AppAction::Input(ch) => {
                if let Some(field) = form.active_text_mut() {
                    field.push(ch);
                } else if form.focus == TransactionFormField::Type {
                    match ch {
                        'i' | 'I' => form.kind = TransactionType::Income,
                        'e' | 'E' => form.kind = TransactionType::Expense,
                        _ => {}
                    }
                }
            }
            AppAction::Submit => self.submit_transaction(),
            _ => {}
        }
    }

    fn submit_transaction(&mut self) {
        let dashboard = &mut self.state.dashboard;
        if dashboard.saving {
            return;
        }
        let (payload, category) = match dashboard.tx_form.validate(&dashboard.categories) {
            Ok(valid) => valid,
            Err(message) => {
                dashboard.tx_form.error = Some(message);
                return;
            }
        };
        dashboard.tx_form.error = None;
        dashboard.saving = true;

        let client = self.session.client().clone();
        self.spawn_request(async move {
            let result = client.transactions_create(&payload, &category).await;
            AppEvent::TransactionSaved { result }
        });
    }

    fn finish_transaction_save(&mut self, result: ApiResult<()>) {
        let dashboard = &mut self.state.dashboard;
        dashboard.saving = false;
        match result {
            Ok(()) => {
                dashboard.tx_form = TransactionForm::new(self.config.today());
                dashboard.mode = DashboardMode::View;
                dashboard.refresh_requested = true;
                self.toast(ToastLevel::Success, "Transaction added.");
            }
            Err(err) => {
                tracing::warn!("create transaction failed: {err}");
                dashboard.tx_form.error = Some(err.user_message());
            }
        }
    }

    fn handle_category_form_key(&mut self, action: AppAction) {
        let dashboard = &mut self.state.dashboard;
        let form = &mut dashboard.category_form;
        match action {
            AppAction::Cancel => dashboard.mode = DashboardMode::View,
            AppAction::NextField => form.advance_focus(),
            AppAction::Backspace => {
                form.active_text_mut().pop();
            }
            AppAction::Input(ch) => form.active_text_mut().push(ch),
            AppAction::Submit => self.submit_category(),
            _ => {}
        }
    }

    fn submit_category(&mut self) {
        let dashboard = &mut self.state.dashboard;
        if dashboard.saving {
            return;
        }
        let form = &mut dashboard.category_form;
        let payload = match form.validate() {
            Ok(payload) => payload,
            Err(message) => {
                form.error = Some(message);
                return;
            }
        };
        form.error = None;
        let editing = form.editing.clone();
        dashboard.saving = true;

        let client = self.session.client().clone();
        self.spawn_request(async move {
            let result = match editing.as_deref() {
                Some(original) => client.categories_update(original, &payload).await,
                None => client.categories_create(&payload).await,
            };
            AppEvent::CategorySaved {
                name: payload.name,
                updated: editing.is_some(),
                result,
            }
        });
    }

    fn finish_category_save(&mut self, name: &str, updated: bool, result: ApiResult<()>) {
        let dashboard = &mut self.state.dashboard;
        dashboard.saving = false;
        match result {
            Ok(()) => {
                dashboard.category_form = CategoryForm::default();
                dashboard.mode = DashboardMode::View;
                dashboard.refresh_requested = true;
                let verb = if updated { "updated" } else { "created" };
                self.toast(ToastLevel::Success, format!("Category \"{name}\" {verb}."));
            }
            Err(err) => {
                tracing::warn!("save category failed: {err}");
                let message = match err {
                    ClientError::Conflict(_) => {
                        format!("A category named \"{name}\" already exists.")
                    }
                    other => other.user_message(),
                };
                dashboard.category_form.error = Some(message);
            }
        }
    }

    fn handle_confirm_delete_key(&mut self, action: AppAction) {
        match action {
            AppAction::Input('y' | 'Y') | AppAction::Submit => self.delete_selected_category(),
            AppAction::Input('n' | 'N') | AppAction::Cancel => {
                self.state.dashboard.mode = DashboardMode::View;
            }
            _ => {}
        }
    }

    fn delete_selected_category(&mut self) {
        let dashboard = &mut self.state.dashboard;
        dashboard.mode = DashboardMode::View;
        if dashboard.saving {
            return;
        }
        let Some(name) = dashboard.selected_category().map(|c| c.name.clone()) else {
            return;
        };
        dashboard.saving = true;

        let client = self.session.client().clone();
        self.spawn_request(async move {
            let result = client.categories_delete(&name).await;
            AppEvent::CategoryDeleted { name, result }
        });
    }

    /// The category list is left as is on failure; it only changes through
    /// the refetch that follows a successful delete.
    fn finish_category_delete(&mut self, name: &str, result: ApiResult<()>) {
        self.state.dashboard.saving = false;
        match result {
            Ok(()) => {
                self.state.dashboard.refresh_requested = true;
                self.toast(ToastLevel::Success, format!("Category \"{name}\" deleted."));
            }
            Err(err) => {
                tracing::warn!("delete category {name:?} failed: {err}");
                self.toast(ToastLevel::Error, delete_message_for_error(name, &err));
            }
        }
    }

    fn open_transactions(&mut self) {
        self.state.section = Section::Transactions;
        let view = &self.state.transactions.view;
        if view.totals().is_none() && !view.is_loading() {
            let ticket = self.state.transactions.view.begin_fetch();
            self.spawn_filter_fetch(ticket);
        }
    }

    fn handle_transactions_key(&mut self, action: AppAction) {
        match self.state.transactions.mode {
            TransactionsMode::List => self.handle_transactions_list_key(action),
            TransactionsMode::Filter => self.handle_filter_key(action),
        }
    }

    fn handle_transactions_list_key(&mut self, action: AppAction) {
        match action {
            AppAction::Up => self.state.transactions.select_prev(),
            AppAction::Down => self.state.transactions.select_next(),
            AppAction::Input(ch) => {
                if self.handle_global_char(ch) {
                    return;
                }
                match ch {
                    'j' | 'J' => self.state.transactions.select_next(),
                    'k' | 'K' => self.state.transactions.select_prev(),
                    '/' => {
                        let tx = &mut self.state.transactions;
                        tx.mode = TransactionsMode::Filter;
                        let focus = tx.focus;
                        tx.focus_field(focus);
                    }
                    'c' | 'C' => {
                        if self.state.transactions.view.has_active_filters() {
                            let ticket = self.state.transactions.view.clear_filters();
                            self.spawn_filter_fetch(ticket);
                        }
                    }
                    'r' | 'R' => {
                        let ticket = self.state.transactions.view.begin_fetch();
                        self.spawn_filter_fetch(ticket);
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, action: AppAction) {
        let focus = self.state.transactions.focus;
        let is_date = matches!(focus, FilterField::Start | FilterField::End);

        match action {
            AppAction::Cancel => {
                let tx = &mut self.state.transactions;
                tx.mode = TransactionsMode::List;
                tx.input_error = None;
            }
            AppAction::NextField => {
                let next = focus.next();
                self.state.transactions.focus_field(next);
            }
            AppAction::Left | AppAction::Right if !is_date => {
                let forward = action == AppAction::Right;
                let change = self.cycled_filter(focus, forward);
                self.apply_filter_change(change);
            }
            AppAction::Backspace if is_date => {
                self.state.transactions.date_input.pop();
            }
            AppAction::Input(ch) if is_date => {
                if ch.is_ascii_digit() || ch == '-' {
                    self.state.transactions.date_input.push(ch);
                }
            }
            AppAction::Submit if is_date => {
                let tx = &mut self.state.transactions;
                match forms::parse_optional_date(&tx.date_input) {
                    Ok(date) => {
                        tx.input_error = None;
                        let change = match focus {
                            FilterField::Start => FilterChange::Start(date),
                            _ => FilterChange::End(date),
                        };
                        self.apply_filter_change(change);
                    }
                    Err(message) => tx.input_error = Some(message),
                }
            }
            AppAction::Submit => self.state.transactions.mode = TransactionsMode::List,
            _ => {}
        }
    }

    fn cycled_filter(&self, field: FilterField, forward: bool) -> FilterChange {
        let criteria = self.state.transactions.view.criteria();
        match field {
            FilterField::Type => FilterChange::Type(forms::cycle_option(
                criteria.kind.as_ref(),
                &[TransactionType::Income, TransactionType::Expense],
                forward,
            )),
            _ => {
                let names: Vec<String> = self
                    .state
                    .dashboard
                    .categories
                    .iter()
                    .map(|c| c.name.clone())
                    .collect();
                FilterChange::Category(forms::cycle_option(
                    criteria.category_name.as_ref(),
                    &names,
                    forward,
                ))
            }
        }
    }

    fn apply_filter_change(&mut self, change: FilterChange) {
        if let Some(ticket) = self.state.transactions.view.set_filter(change) {
            self.state.transactions.selected = 0;
            self.spawn_filter_fetch(ticket);
        }
    }

    fn spawn_filter_fetch(&self, ticket: FetchTicket) {
        let client = self.session.client().clone();
        self.spawn_request(async move {
            let result = client.transactions_filtered(&ticket.query).await;
            AppEvent::Filtered {
                seq: ticket.seq,
                result,
            }
        });
    }
}

/// Delete is the one place where a conflict has a specific meaning: the
/// category is still referenced by transactions.
pub fn delete_message_for_error(name: &str, err: &ClientError) -> String {
    match err {
        ClientError::Conflict(_) => {
            format!("Cannot delete category \"{name}\": it still has transactions.")
        }
        other => other.user_message(),
    }
}
