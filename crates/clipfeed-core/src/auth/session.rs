//! Session management.
//!
//! [`SessionManager`] owns the in-memory authentication state and
//! orchestrates login, logout, and token refresh over a [`TokenStore`]. It is
//! an injectable instance rather than a process-wide singleton; share it via
//! `Arc` between the request client and whatever drives the UI.
//!
//! The session moves between four states: unchecked (before the first
//! [`check_auth_status`](SessionManager::check_auth_status)), unauthenticated,
//! authenticated, and a transient refreshing state entered only inside
//! [`refresh_access_token`](SessionManager::refresh_access_token).

use reqwest::Client;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::api::envelope::Envelope;
use crate::api::error::error_message;
use crate::auth::claims;
use crate::auth::error::AuthError;
use crate::auth::store::TokenStore;
use crate::models::{RefreshData, User};

/// In-memory authentication state.
///
/// `is_authenticated` is derived from the last successful check or login;
/// `initial_check_complete` stays false until the first
/// `check_auth_status` finishes, so consumers can hold off on auth-gated
/// redirect decisions until persisted credentials have been read.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub initial_check_complete: bool,
}

/// Orchestrates authentication against the remote API.
///
/// The token store is the durable source of truth; the state held here is a
/// cache re-derived by `check_auth_status` and updated by login, logout, and
/// refresh.
pub struct SessionManager {
    base_url: String,
    http: Client,
    tokens: TokenStore,
    state: RwLock<SessionState>,
    // Serializes refresh attempts so concurrent 401s coalesce into one
    // wire call.
    refresh_gate: Mutex<()>,
}

impl SessionManager {
    pub fn new(base_url: impl Into<String>, tokens: TokenStore) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
            tokens,
            state: RwLock::new(SessionState::default()),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated
    }

    pub async fn initial_check_complete(&self) -> bool {
        self.state.read().await.initial_check_complete
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// Re-derive the authentication state from the token store.
    ///
    /// Safe to call repeatedly; runs once at startup and whenever a consumer
    /// needs a fresh determination. A partial credential bundle is cleared
    /// outright - the three keys live and die together.
    pub async fn check_auth_status(&self) -> bool {
        let creds = self.tokens.read();
        let (user, access_token) = match (creds.user, creds.access_token, creds.refresh_token) {
            (Some(user), Some(access_token), Some(_)) => (user, access_token),
            _ => {
                self.tokens.clear();
                let mut state = self.state.write().await;
                state.user = None;
                state.is_authenticated = false;
                state.initial_check_complete = true;
                return false;
            }
        };

        if !claims::is_expired(&access_token) {
            let mut state = self.state.write().await;
            state.user = Some(user);
            state.is_authenticated = true;
            state.initial_check_complete = true;
            return true;
        }

        match self.refresh_access_token().await {
            Ok(_) => {
                let mut state = self.state.write().await;
                state.user = Some(user);
                state.is_authenticated = true;
                state.initial_check_complete = true;
                true
            }
            Err(e) => {
                debug!(error = %e, "auth check could not refresh expired token");
                // refresh_access_token already cleared credentials and state
                let mut state = self.state.write().await;
                state.initial_check_complete = true;
                false
            }
        }
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Concurrent callers are coalesced: whoever holds the gate performs the
    /// wire call, and callers that were waiting observe the changed token and
    /// return it without a second request. On any failure the credential
    /// bundle is cleared and the session deauthenticated before the error
    /// propagates.
    ///
    /// # Errors
    ///
    /// [`AuthError::NoRefreshToken`] when no refresh token is stored (no
    /// network call is made), [`AuthError::RefreshFailed`] when the endpoint
    /// rejects the token, [`AuthError::Network`] on transport failure.
    pub async fn refresh_access_token(&self) -> Result<String, AuthError> {
        let stale = self.tokens.access_token();
        let _gate = self.refresh_gate.lock().await;

        // Another caller may have refreshed while we waited on the gate.
        if let Some(current) = self.tokens.access_token() {
            if stale.as_deref() != Some(current.as_str()) {
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.tokens.refresh_token() else {
            self.deauthenticate().await;
            return Err(AuthError::NoRefreshToken);
        };

        let url = format!("{}/auth/refresh-token", self.base_url);
        let response = match self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.deauthenticate().await;
                return Err(AuthError::Network(e));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                self.deauthenticate().await;
                return Err(AuthError::Network(e));
            }
        };

        if !status.is_success() {
            let message = error_message(&body)
                .unwrap_or_else(|| format!("refresh endpoint returned status {}", status.as_u16()));
            self.deauthenticate().await;
            return Err(AuthError::RefreshFailed(message));
        }

        let envelope: Envelope<RefreshData> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) => {
                self.deauthenticate().await;
                return Err(AuthError::RefreshFailed(
                    "unparseable refresh response".to_string(),
                ));
            }
        };

        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "Failed to refresh token".to_string());
            self.deauthenticate().await;
            return Err(AuthError::RefreshFailed(message));
        }

        let Some(data) = envelope.data else {
            self.deauthenticate().await;
            return Err(AuthError::RefreshFailed(
                "refresh response missing data".to_string(),
            ));
        };

        if let Err(e) = self.tokens.write_access_token(&data.access_token) {
            self.deauthenticate().await;
            return Err(AuthError::Storage(e));
        }

        debug!("access token refreshed");
        Ok(data.access_token)
    }

    /// Persist a freshly issued credential bundle and mark the session
    /// authenticated.
    pub async fn login(
        &self,
        user: User,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), AuthError> {
        self.tokens.write(&user, access_token, refresh_token)?;

        info!(name = %user.name, "login successful");

        let mut state = self.state.write().await;
        state.user = Some(user);
        state.is_authenticated = true;
        Ok(())
    }

    /// Best-effort sign-out, then unconditional local deauthentication.
    ///
    /// The sign-out call goes straight through the session's own HTTP client
    /// rather than the retrying request client, so a dead session never
    /// triggers a refresh attempt during logout. API failure is logged and
    /// otherwise ignored.
    pub async fn logout(&self) {
        if let Some(access_token) = self.tokens.access_token() {
            let url = format!("{}/auth/signout", self.base_url);
            match self.http.post(&url).bearer_auth(&access_token).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("signed out");
                }
                Ok(response) => {
                    warn!(status = %response.status(), "signout endpoint rejected the request");
                }
                Err(e) => {
                    warn!(error = %e, "signout request failed");
                }
            }
        }

        self.deauthenticate().await;
    }

    async fn deauthenticate(&self) {
        self.tokens.clear();
        let mut state = self.state.write().await;
        state.user = None;
        state.is_authenticated = false;
    }
}
