use super::{SessionStore, AUTH_KEY, AUTH_SENTINEL, TOKEN_KEY, TOKEN_SENTINEL};
use crate::models::{LoginRequest, LoginResponse};
use crate::{Error, Result};
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};

const GENERIC_LOGIN_FAILURE: &str = "Login failed. Please try again.";

/// Proof that the gate admitted the operator. Components that act on the
/// content API take one of these instead of reading session storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    _private: (),
}

pub struct SessionGate {
    store: Arc<dyn SessionStore>,
    client: Client,
    login_url: String,
}

impl SessionGate {
    pub fn new(store: Arc<dyn SessionStore>, login_url: String) -> Self {
        Self::new_with_client(store, login_url, Client::new())
    }

    pub fn new_with_client(store: Arc<dyn SessionStore>, login_url: String, client: Client) -> Self {
        Self {
            store,
            client,
            login_url,
        }
    }

    /// True only when both persisted values equal their sentinels. Storage
    /// errors read as "not authenticated".
    pub fn check_authentication(&self) -> bool {
        self.admit().is_ok()
    }

    pub fn admit(&self) -> Result<AdminSession> {
        let read = |key: &str| {
            self.store.get(key).unwrap_or_else(|e| {
                warn!("Could not read session value {}: {}", key, e);
                None
            })
        };

        match (read(AUTH_KEY), read(TOKEN_KEY)) {
            (Some(flag), Some(token)) if flag == AUTH_SENTINEL && token == TOKEN_SENTINEL => {
                Ok(AdminSession { _private: () })
            }
            _ => Err(Error::NotAuthenticated),
        }
    }

    /// Exchange credentials for a token and persist it. Nothing is written
    /// unless the backend reports success.
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminSession> {
        let response = self
            .client
            .post(&self.login_url)
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|e| {
                warn!("Login request failed: {}", e);
                Error::LoginRejected(GENERIC_LOGIN_FAILURE.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: LoginResponse = serde_json::from_str(&body).unwrap_or_default();

        let token = match parsed.token {
            Some(token) if status.is_success() && parsed.success => token,
            _ => {
                let message = parsed
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_LOGIN_FAILURE.to_string());
                warn!("Login rejected (status {}): {}", status, message);
                return Err(Error::LoginRejected(message));
            }
        };

        if token != TOKEN_SENTINEL {
            warn!("Login succeeded but the returned token will not pass the session check");
        }

        self.store.set(TOKEN_KEY, &token)?;
        if let Err(e) = self.store.set(AUTH_KEY, AUTH_SENTINEL) {
            // Never leave a token behind without its flag.
            if let Err(clear_err) = self.store.clear(TOKEN_KEY) {
                warn!("Could not roll back session token: {}", clear_err);
            }
            return Err(e);
        }
        info!("Logged in as {}", username);

        Ok(AdminSession { _private: () })
    }

    pub fn logout(&self) -> Result<()> {
        self.store.clear(AUTH_KEY)?;
        self.store.clear(TOKEN_KEY)?;
        info!("Logged out");
        Ok(())
    }
}
