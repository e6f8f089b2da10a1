use std::{fs, path::Path};

use api_types::auth::{AuthResponse, Login, Register};
use serde::{Deserialize, Serialize};

use crate::{
    client::{Client, ClientError, GENERIC_ERROR_MESSAGE, SessionToken},
    error::Result,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserIdentity {
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoredSession {
    pub token: Option<String>,
    pub user: Option<UserIdentity>,
}

/// JSON file holding the last session so a restart does not require login.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: String,
}

impl TokenStore {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<StoredSession> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredSession::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = Path::new(&self.path).parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Failure(String),
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Owns the credential for the lifetime of the app.
///
/// The token slot is shared with the [`Client`]; the store keeps it across
/// restarts. Token validity is never checked here: an expired token shows up
/// as [`ClientError::Unauthorized`] on the next request. Clones share the
/// token slot, so a clone can authenticate in a background task and be handed
/// back to the app afterwards.
#[derive(Debug, Clone)]
pub struct AuthSession {
    client: Client,
    store: TokenStore,
    user: Option<UserIdentity>,
}

impl AuthSession {
    pub fn new(client: Client, store: TokenStore) -> Self {
        Self {
            client,
            store,
            user: None,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn token(&self) -> &SessionToken {
        self.client.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_present()
    }

    /// Loads a persisted token into the client. Returns whether one was found.
    pub fn restore(&mut self) -> bool {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!("ignoring unreadable session file: {err}");
                return false;
            }
        };
        match stored.token {
            Some(token) if !token.trim().is_empty() => {
                self.token().set(Some(token));
                self.user = stored.user;
                tracing::info!("restored persisted session");
                true
            }
            _ => false,
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> AuthOutcome {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return AuthOutcome::Failure("Email and password are required.".to_string());
        }

        let payload = Login {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.client.login(&payload).await {
            Ok(res) => self.accept(res, None, email),
            Err(err) => AuthOutcome::Failure(auth_message_for_error(err)),
        }
    }

    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> AuthOutcome {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return AuthOutcome::Failure("Name, email and password are required.".to_string());
        }

        let payload = Register {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.client.register(&payload).await {
            Ok(res) if res.token.is_some() => self.accept(res, Some(name), email),
            Ok(_) => {
                tracing::debug!("registration returned no token, logging in");
                let outcome = self.login(email, password).await;
                if outcome.is_success() {
                    if let Some(user) = self.user.as_mut() {
                        user.name.get_or_insert_with(|| name.to_string());
                    }
                    self.persist();
                }
                outcome
            }
            Err(err) => AuthOutcome::Failure(auth_message_for_error(err)),
        }
    }

    /// Forgets the credential locally; the backend is not contacted.
    pub fn logout(&mut self) {
        self.token().clear();
        self.user = None;
        if let Err(err) = self.store.clear() {
            tracing::warn!("failed to remove session file: {err}");
        }
        tracing::info!("logged out");
    }

    fn accept(&mut self, res: AuthResponse, name: Option<&str>, email: &str) -> AuthOutcome {
        let Some(token) = res.token.filter(|t| !t.trim().is_empty()) else {
            return AuthOutcome::Failure("Login response did not include a token.".to_string());
        };
        self.token().set(Some(token));
        self.user = Some(UserIdentity {
            name: res.name.or_else(|| name.map(str::to_string)),
            email: res.email.unwrap_or_else(|| email.to_string()),
        });
        self.persist();
        tracing::info!("authenticated as {email}");
        AuthOutcome::Success
    }

    fn persist(&self) {
        let stored = StoredSession {
            token: self.token().get(),
            user: self.user.clone(),
        };
        if let Err(err) = self.store.save(&stored) {
            tracing::warn!("failed to persist session: {err}");
        }
    }
}

fn auth_message_for_error(err: ClientError) -> String {
    match err {
        ClientError::Unauthorized | ClientError::Forbidden => {
            "Invalid email or password.".to_string()
        }
        ClientError::Conflict(message) | ClientError::Validation(message) => message,
        ClientError::Transport(_) => "Server unreachable. Check your connection.".to_string(),
        ClientError::NotFound | ClientError::Server(_) => GENERIC_ERROR_MESSAGE.to_string(),
    }
}
