use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use api_types::{
    category::CategoryNew,
    transaction::{TransactionNew, TransactionType},
};
use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use finance_tui::{
    app::delete_message_for_error,
    client::{Client, ClientError, SessionToken},
    filters::{FetchOutcome, FilterChange, FilterViewModel},
    session::{AuthOutcome, AuthSession, TokenStore},
};
use serde_json::{Value, json};
use tokio::sync::mpsc;

const TOKEN: &str = "tok-123";
const BEARER: &str = "Bearer tok-123";

#[derive(Clone, Default)]
struct Backend {
    queries: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
    categories: Arc<Mutex<Vec<String>>>,
}

impl Backend {
    fn record(&self, query: Option<String>) -> String {
        let query = query.unwrap_or_default();
        self.queries.lock().unwrap().push(query.clone());
        query
    }

    fn last_query(&self) -> String {
        self.queries.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(BEARER)
}

fn tx_json(id: i64, amount: f64, kind: &str, category: Value) -> Value {
    json!({
        "id": id,
        "amount": amount,
        "type": kind,
        "date": "2024-03-01",
        "title": null,
        "category": category,
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        return Json(json!({ "token": TOKEN, "name": "Asha" })).into_response();
    }
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad credentials" }))).into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@example.com" {
        return (StatusCode::CONFLICT, "Email already registered").into_response();
    }
    (StatusCode::CREATED, "User registered successfully").into_response()
}

async fn list_categories(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let names = backend.categories.lock().unwrap().clone();
    let body: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| json!({ "id": i, "name": name, "description": null }))
        .collect();
    Json(body).into_response()
}

async fn add_category(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    backend.categories.lock().unwrap().push(name);
    backend.bodies.lock().unwrap().push(body);
    StatusCode::OK.into_response()
}

async fn delete_category(State(backend): State<Backend>, Path(name): Path<String>) -> Response {
    if name == "Food" {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Category has transactions" })),
        )
            .into_response();
    }
    backend.categories.lock().unwrap().retain(|c| *c != name);
    StatusCode::NO_CONTENT.into_response()
}

async fn add_transaction(
    State(backend): State<Backend>,
    RawQuery(query): RawQuery,
    Json(body): Json<Value>,
) -> Response {
    backend.record(query);
    backend.bodies.lock().unwrap().push(body);
    StatusCode::CREATED.into_response()
}

async fn filter(State(backend): State<Backend>, RawQuery(query): RawQuery) -> Response {
    let query = backend.record(query);

    if query.contains("categoryName=Broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    if query.contains("type=INCOME") {
        tokio::time::sleep(Duration::from_millis(300)).await;
        return Json(json!({
            "transactions": [
                tx_json(1, 3000.0, "INCOME", json!({ "id": 1, "name": "Job" })),
                tx_json(2, 2000.0, "INCOME", json!("Freelance")),
            ],
            "totalIncome": 5000,
            "totalExpenses": 0,
            "netAmount": 5000,
            "transactionCount": 2,
        }))
        .into_response();
    }
    if query.contains("type=EXPENSE") {
        return Json(json!({
            "transactions": [tx_json(3, 40.0, "EXPENSE", json!("Food"))],
            "totalIncome": 0,
            "totalExpenses": 40,
            "netAmount": -40,
            "transactionCount": 1,
        }))
        .into_response();
    }
    Json(json!({
        "transactions": [
            tx_json(1, 3000.0, "INCOME", json!({ "id": 1, "name": "Job" })),
            tx_json(3, 40.0, "EXPENSE", json!("Food")),
        ],
        "totalIncome": 3000,
        "totalExpenses": 40,
        "netAmount": 2960,
        "transactionCount": 2,
    }))
    .into_response()
}

async fn summary(State(backend): State<Backend>, RawQuery(query): RawQuery) -> Response {
    backend.record(query);
    Json(json!({ "totalIncome": 3000, "totalExpense": 40, "balance": 2960 })).into_response()
}

async fn spawn_backend() -> (SocketAddr, Backend) {
    let backend = Backend::default();
    backend.categories.lock().unwrap().push("Food".to_string());

    let router = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/api/categories/all", get(list_categories))
        .route("/api/categories/add", post(add_category))
        .route("/api/categories/{name}", delete(delete_category))
        .route("/api/transactions/add", post(add_transaction))
        .route("/api/transactions/filter", get(filter))
        .route("/api/dashboard/summary", get(summary))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, backend)
}

fn client_for(addr: SocketAddr, token: SessionToken) -> Client {
    Client::new(&format!("http://{addr}/"), token).unwrap()
}

fn temp_store(name: &str) -> (TokenStore, String) {
    let path = std::env::temp_dir()
        .join(format!("finance_tui_it_{name}_{}", std::process::id()))
        .join("session.json")
        .display()
        .to_string();
    (TokenStore::new(path.clone()), path)
}

#[tokio::test]
async fn unfiltered_fetch_sends_no_parameters() {
    let (addr, backend) = spawn_backend().await;
    let client = client_for(addr, SessionToken::with_token(TOKEN));
    let mut view = FilterViewModel::new();

    assert_eq!(view.fetch(&client).await, FetchOutcome::Applied);
    assert_eq!(backend.last_query(), "");
    assert_eq!(view.transactions().len(), 2);
    assert_eq!(view.totals().unwrap().net_amount, 2960.0);
}

#[tokio::test]
async fn only_set_criteria_become_query_parameters() {
    let (addr, backend) = spawn_backend().await;
    let client = client_for(addr, SessionToken::with_token(TOKEN));
    let mut view = FilterViewModel::new();

    view.set_filter(FilterChange::Category(Some("Food".to_string())));
    view.set_filter(FilterChange::Start(NaiveDate::from_ymd_opt(2024, 1, 1)));
    view.fetch(&client).await;
    assert_eq!(backend.last_query(), "categoryName=Food&start=2024-01-01");

    view.set_filter(FilterChange::Category(None));
    view.set_filter(FilterChange::Type(Some(TransactionType::Expense)));
    view.set_filter(FilterChange::End(NaiveDate::from_ymd_opt(2024, 1, 31)));
    view.fetch(&client).await;
    assert_eq!(
        backend.last_query(),
        "type=EXPENSE&start=2024-01-01&end=2024-01-31"
    );
}

#[tokio::test]
async fn clearing_filters_reproduces_initial_load() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr, SessionToken::with_token(TOKEN));
    let mut view = FilterViewModel::new();

    view.fetch(&client).await;
    let initial = (view.transactions().to_vec(), view.totals());

    let ticket = view
        .set_filter(FilterChange::Type(Some(TransactionType::Expense)))
        .unwrap();
    let res = client.transactions_filtered(&ticket.query).await;
    view.complete(ticket.seq, res);
    assert_eq!(view.transactions().len(), 1);

    let ticket = view.clear_filters();
    let res = client.transactions_filtered(&ticket.query).await;
    view.complete(ticket.seq, res);
    assert_eq!((view.transactions().to_vec(), view.totals()), initial);
}

#[tokio::test]
async fn income_filter_renders_backend_totals() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr, SessionToken::with_token(TOKEN));
    let mut view = FilterViewModel::new();

    view.set_filter(FilterChange::Type(Some(TransactionType::Income)));
    assert_eq!(view.fetch(&client).await, FetchOutcome::Applied);

    let names: Vec<_> = view
        .transactions()
        .iter()
        .map(|tx| tx.category_name().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, ["Job", "Freelance"]);
    let totals = view.totals().unwrap();
    assert_eq!(totals.total_income, 5000.0);
    assert_eq!(totals.total_expenses, 0.0);
    assert_eq!(totals.net_amount, 5000.0);
    assert_eq!(totals.transaction_count, 2);
    assert_eq!(view.income_badge(), Some("Filtered Result"));
}

#[tokio::test]
async fn failed_refresh_keeps_last_snapshot() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr, SessionToken::with_token(TOKEN));
    let mut view = FilterViewModel::new();

    view.fetch(&client).await;
    let before = (view.transactions().to_vec(), view.totals());

    view.set_filter(FilterChange::Category(Some("Broken".to_string())));
    assert_eq!(view.fetch(&client).await, FetchOutcome::Failed);

    assert_eq!((view.transactions().to_vec(), view.totals()), before);
    assert!(view.error().is_some());
}

#[tokio::test]
async fn late_income_response_does_not_override_expense() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr, SessionToken::with_token(TOKEN));
    let mut view = FilterViewModel::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let tickets = [
        view.set_filter(FilterChange::Type(Some(TransactionType::Income)))
            .unwrap(),
        view.set_filter(FilterChange::Type(Some(TransactionType::Expense)))
            .unwrap(),
    ];
    for ticket in tickets {
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.transactions_filtered(&ticket.query).await;
            tx.send((ticket.seq, result)).unwrap();
        });
    }

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let (seq, result) = rx.recv().await.unwrap();
        outcomes.push(view.complete(seq, result));
    }

    assert_eq!(outcomes, [FetchOutcome::Applied, FetchOutcome::Stale]);
    assert!(!view.is_loading());
    assert_eq!(view.transactions().len(), 1);
    assert_eq!(view.transactions()[0].kind, TransactionType::Expense);
    assert_eq!(view.totals().unwrap().total_expenses, 40.0);
}

#[tokio::test]
async fn deleting_referenced_category_is_a_conflict() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr, SessionToken::with_token(TOKEN));

    let before = client.categories_list().await.unwrap();
    let err = client.categories_delete("Food").await.unwrap_err();
    assert!(matches!(err, ClientError::Conflict(ref msg) if msg == "Category has transactions"));
    assert!(delete_message_for_error("Food", &err).contains("Food"));

    let after = client.categories_list().await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn category_names_are_path_encoded() {
    let (addr, backend) = spawn_backend().await;
    let client = client_for(addr, SessionToken::with_token(TOKEN));

    client
        .categories_create(&CategoryNew {
            name: "Eating out".to_string(),
            description: None,
        })
        .await
        .unwrap();
    client.categories_delete("Eating out").await.unwrap();

    assert_eq!(*backend.categories.lock().unwrap(), ["Food"]);
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let (addr, _backend) = spawn_backend().await;
    let client = client_for(addr, SessionToken::new());

    let err = client.categories_list().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
}

#[tokio::test]
async fn login_attaches_bearer_token_and_persists_it() {
    let (addr, _backend) = spawn_backend().await;
    let (store, path) = temp_store("login");
    let mut session = AuthSession::new(client_for(addr, SessionToken::new()), store);

    let outcome = session.login("asha@example.com", "wrong").await;
    assert_eq!(
        outcome,
        AuthOutcome::Failure("Invalid email or password.".to_string())
    );
    assert!(!session.is_authenticated());

    assert!(session.login("asha@example.com", "secret").await.is_success());
    assert_eq!(session.user().and_then(|u| u.name.as_deref()), Some("Asha"));
    assert!(session.client().categories_list().await.is_ok());

    let stored = TokenStore::new(path).load().unwrap();
    assert_eq!(stored.token.as_deref(), Some(TOKEN));

    session.logout();
    assert!(matches!(
        session.client().categories_list().await,
        Err(ClientError::Unauthorized)
    ));
}

#[tokio::test]
async fn register_without_token_falls_back_to_login() {
    let (addr, _backend) = spawn_backend().await;
    let (store, _path) = temp_store("register");
    let mut session = AuthSession::new(client_for(addr, SessionToken::new()), store);

    let outcome = session
        .register("Asha", "asha@example.com", "secret")
        .await;
    assert!(outcome.is_success());
    assert_eq!(session.token().get().as_deref(), Some(TOKEN));

    let outcome = session
        .register("Ravi", "taken@example.com", "secret")
        .await;
    assert_eq!(
        outcome,
        AuthOutcome::Failure("Email already registered".to_string())
    );
}

#[tokio::test]
async fn create_transaction_sends_category_as_query() {
    let (addr, backend) = spawn_backend().await;
    let client = client_for(addr, SessionToken::with_token(TOKEN));

    client
        .transactions_create(
            &TransactionNew {
                amount: 250.5,
                kind: TransactionType::Expense,
                date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
                title: Some("Lunch".to_string()),
            },
            "Eating out",
        )
        .await
        .unwrap();

    assert_eq!(backend.last_query(), "categoryName=Eating+out");
    let body = backend.bodies.lock().unwrap().last().cloned().unwrap();
    assert_eq!(body["type"], "EXPENSE");
    assert_eq!(body["date"], "2024-05-17");
    assert_eq!(body["amount"], 250.5);
}

#[tokio::test]
async fn dashboard_summary_month_scope() {
    let (addr, backend) = spawn_backend().await;
    let client = client_for(addr, SessionToken::with_token(TOKEN));

    let all_time = client.dashboard_summary(None).await.unwrap();
    assert_eq!(backend.last_query(), "");
    assert_eq!(all_time.balance, 2960.0);

    client
        .dashboard_summary(NaiveDate::from_ymd_opt(2024, 5, 17))
        .await
        .unwrap();
    assert_eq!(backend.last_query(), "month=2024-05");
}
