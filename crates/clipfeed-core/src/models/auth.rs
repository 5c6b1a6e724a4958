use serde::{Deserialize, Serialize};

use super::User;

/// Body for POST `/auth/signin`.
#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Body for POST `/auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Payload returned by the sign-in and sign-up endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthData {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub user: User,
}

/// Payload returned by the refresh endpoint. Only a new access token is
/// issued; the refresh token on record stays valid.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshData {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}
