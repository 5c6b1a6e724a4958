//! REST API client module.
//!
//! Provides the [`ApiClient`] for talking to the clipfeed API: bearer-token
//! injection, a single 401-triggered refresh-and-retry, and classification of
//! failures into [`ApiError`]. Response bodies follow the documented
//! `{success, data, message, pagination?}` envelope, typed as [`Envelope`].

pub mod client;
pub mod envelope;
pub mod error;

pub use client::ApiClient;
pub use envelope::{Envelope, Pagination};
pub use error::ApiError;
