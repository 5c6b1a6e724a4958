//! Data models for the clipfeed API.
//!
//! Wire records use the API's camelCase field names via serde renames:
//!
//! - `User`, `YoutubeLink`: profile records persisted with the session
//! - `ContentItem`, `ContentAuthor`: shared-content feed entries
//! - Auth payloads: `SignInRequest`, `SignUpRequest`, `AuthData`, `RefreshData`

pub mod auth;
pub mod content;
pub mod user;

pub use auth::{AuthData, RefreshData, SignInRequest, SignUpRequest};
pub use content::{ContentAuthor, ContentItem};
pub use user::{User, YoutubeLink};
