use serde::{Deserialize, Serialize};

/// One entry in the shared-content feed (`/users/content`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "videoId", default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub user: ContentAuthor,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

/// The author attached to a feed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentAuthor {
    pub id: String,
    pub name: String,
    #[serde(rename = "profilePictureUrl", default)]
    pub profile_picture_url: Option<String>,
}
