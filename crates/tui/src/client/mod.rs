use std::sync::{Arc, RwLock};

use api_types::{
    auth::{AuthResponse, Login, Register},
    category::{Category, CategoryNew},
    dashboard::DashboardSummary,
    transaction::{FilteredTransactions, Transaction, TransactionFilter, TransactionNew},
};
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::error::{AppError, Result};

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Short message suitable for the status line of any screen.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Session expired or invalid. Please log in again.".to_string(),
            Self::Transport(_) => "Server unreachable. Check your connection.".to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Shared slot holding the bearer token of the current session.
///
/// Owned by the session holder and injected into [`Client`]; every request
/// reads the slot at send time, so login and logout take effect immediately
/// for clones of the client already handed to background tasks.
#[derive(Debug, Clone, Default)]
pub struct SessionToken {
    inner: Arc<RwLock<Option<String>>>,
}

impl SessionToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let slot = Self::new();
        slot.set(Some(token.into()));
        slot
    }

    pub fn get(&self) -> Option<String> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, token: Option<String>) {
        let token = token.filter(|t| !t.trim().is_empty());
        match self.inner.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    pub fn clear(&self) {
        self.set(None);
    }

    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    token: SessionToken,
}

impl Client {
    pub fn new(base_url: &str, token: SessionToken) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Terminal(format!("invalid base_url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Terminal(format!(
                "invalid base_url: {base_url} cannot be a base"
            )));
        }
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            token,
        })
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub async fn login(&self, payload: &Login) -> std::result::Result<AuthResponse, ClientError> {
        let res = self
            .send(self.request(Method::POST, &["login"])?.json(payload))
            .await?;
        let body = res.text().await?;
        Ok(parse_login_body(&body))
    }

    /// Registers a new account. The returned token is `None` when the backend
    /// only acknowledges the registration.
    pub async fn register(
        &self,
        payload: &Register,
    ) -> std::result::Result<AuthResponse, ClientError> {
        let res = self
            .send(self.request(Method::POST, &["register"])?.json(payload))
            .await?;
        let body = res.text().await?;
        Ok(serde_json::from_str(body.trim()).unwrap_or_default())
    }

    pub async fn categories_list(&self) -> std::result::Result<Vec<Category>, ClientError> {
        let req = self.request(Method::GET, &["api", "categories", "all"])?;
        self.send_json(req).await
    }

    pub async fn categories_create(
        &self,
        payload: &CategoryNew,
    ) -> std::result::Result<(), ClientError> {
        let req = self
            .request(Method::POST, &["api", "categories", "add"])?
            .json(payload);
        self.send(req).await.map(drop)
    }

    pub async fn categories_update(
        &self,
        name: &str,
        payload: &CategoryNew,
    ) -> std::result::Result<(), ClientError> {
        let req = self
            .request(Method::PUT, &["api", "categories", name])?
            .json(payload);
        self.send(req).await.map(drop)
    }

    /// Fails with [`ClientError::Conflict`] while transactions still reference
    /// the category.
    pub async fn categories_delete(&self, name: &str) -> std::result::Result<(), ClientError> {
        let req = self.request(Method::DELETE, &["api", "categories", name])?;
        self.send(req).await.map(drop)
    }

    pub async fn transactions_create(
        &self,
        payload: &TransactionNew,
        category_name: &str,
    ) -> std::result::Result<(), ClientError> {
        let req = self
            .request(Method::POST, &["api", "transactions", "add"])?
            .query(&[("categoryName", category_name)])
            .json(payload);
        self.send(req).await.map(drop)
    }

    pub async fn transactions_list_all(
        &self,
    ) -> std::result::Result<Vec<Transaction>, ClientError> {
        let req = self.request(Method::GET, &["api", "transactions", "all"])?;
        self.send_json(req).await
    }

    pub async fn transactions_filtered(
        &self,
        filter: &TransactionFilter,
    ) -> std::result::Result<FilteredTransactions, ClientError> {
        let req = self
            .request(Method::GET, &["api", "transactions", "filter"])?
            .query(filter);
        self.send_json(req).await
    }

    /// Aggregate summary; `month` scopes it to the calendar month containing
    /// the given date.
    pub async fn dashboard_summary(
        &self,
        month: Option<NaiveDate>,
    ) -> std::result::Result<DashboardSummary, ClientError> {
        let mut req = self.request(Method::GET, &["api", "dashboard", "summary"])?;
        if let Some(month) = month {
            req = req.query(&[("month", month.format("%Y-%m").to_string())]);
        }
        self.send_json(req).await
    }

    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Server("invalid base_url".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> std::result::Result<RequestBuilder, ClientError> {
        let url = self.endpoint(segments)?;
        tracing::debug!("{method} {}", url.path());
        let mut req = self.http.request(method, url);
        if let Some(token) = self.token.get() {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    async fn send(&self, req: RequestBuilder) -> std::result::Result<Response, ClientError> {
        let res = req.send().await?;
        if res.status().is_success() {
            return Ok(res);
        }
        Err(error_for(res).await)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> std::result::Result<T, ClientError> {
        let res = self.send(req).await?;
        Ok(res.json::<T>().await?)
    }
}

async fn error_for(res: Response) -> ClientError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    });
    tracing::warn!("request failed with {status}: {message}");

    match status.as_u16() {
        401 => ClientError::Unauthorized,
        403 => ClientError::Forbidden,
        404 => ClientError::NotFound,
        409 => ClientError::Conflict(message),
        400 | 422 => ClientError::Validation(message),
        _ => ClientError::Server(message),
    }
}

fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorResponse>(trimmed) {
        Ok(parsed) => parsed.error.or(parsed.message),
        Err(_) => Some(trimmed.to_string()),
    }
}

/// Some deployments answer `/login` with the bare token instead of JSON.
fn parse_login_body(body: &str) -> AuthResponse {
    let trimmed = body.trim();
    if let Ok(parsed) = serde_json::from_str::<AuthResponse>(trimmed) {
        return parsed;
    }
    let token = trimmed.trim_matches('"');
    AuthResponse {
        token: (!token.is_empty()).then(|| token.to_string()),
        ..AuthResponse::default()
    }
}
