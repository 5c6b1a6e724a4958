//! Core library for clipfeed, a client for a content-sharing REST API.
//!
//! The interesting part lives in two collaborating pieces:
//!
//! - [`auth`]: credential-bundle storage, token expiry evaluation, and the
//!   [`SessionManager`](auth::SessionManager) that orchestrates login, logout
//!   and coalesced token refresh
//! - [`api`]: the [`ApiClient`](api::ApiClient) that attaches bearer tokens,
//!   retries exactly once after a 401-triggered refresh, and normalizes
//!   failures
//!
//! [`models`] holds the wire records and [`config`] the client configuration.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, Envelope, Pagination};
pub use auth::{
    AuthError, CredentialStore, FileStore, KeyringStore, MemoryStore, SessionManager,
    SessionState, TokenStore,
};
pub use config::Config;
