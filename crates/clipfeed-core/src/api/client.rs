//! Authenticated request client.
//!
//! [`ApiClient`] performs one logical HTTP call with auth-aware retry: it
//! attaches the stored bearer token, and on a 401 asks the session manager
//! for a refresh, then re-issues the identical request exactly once. The
//! retried result is final - there is no second retry loop, and
//! transport-level failures are never retried.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionManager;

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client with bearer injection and single 401-triggered refresh-retry.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    /// Create a new API client sharing the given session.
    pub fn new(base_url: impl Into<String>, session: Arc<SessionManager>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            session,
        })
    }

    /// Perform one logical request.
    ///
    /// A 401 triggers a refresh-and-retry only when a bearer token was
    /// attached to the failed attempt; a 401 on an unauthenticated call
    /// (sign-in, sign-up) is an ordinary [`ApiError::RequestFailed`].
    ///
    /// # Errors
    ///
    /// [`ApiError::SessionExpired`] when the post-401 refresh fails,
    /// [`ApiError::RequestFailed`] for other non-2xx statuses,
    /// [`ApiError::Network`] on transport failure,
    /// [`ApiError::InvalidResponse`] when a 2xx body does not parse.
    pub async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let token = self.session.tokens().access_token();
        let response = self
            .send(method.clone(), endpoint, body, token.as_deref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED && token.is_some() {
            return match self.session.refresh_access_token().await {
                Ok(new_token) => {
                    debug!(endpoint, "retrying request with refreshed token");
                    let retry = self
                        .send(method, endpoint, body, Some(new_token.as_str()))
                        .await?;
                    Self::process(retry).await
                }
                Err(e) => {
                    warn!(endpoint, error = %e, "token refresh failed");
                    Err(ApiError::SessionExpired)
                }
            };
        }

        Self::process(response).await
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, endpoint, None).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::DELETE, endpoint, None).await
    }

    async fn send<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut builder = self.http.request(method, &url);

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(ApiError::Network)
    }

    /// Classify a final response: non-2xx becomes an error with the body's
    /// `message` field, 2xx parses as the caller's type.
    async fn process<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await.map_err(ApiError::Network)?;

        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}
