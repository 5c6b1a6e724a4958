use thiserror::Error;

/// Failures from session operations.
///
/// Every refresh failure deauthenticates as a side effect before the error
/// propagates, so callers can surface the message and redirect to sign-in
/// without any cleanup of their own.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no refresh token available")]
    NoRefreshToken,

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("credential storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
