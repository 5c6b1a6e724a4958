use serde::{Deserialize, Serialize};

/// A user record as returned by the API.
///
/// The auth core treats this as opaque payload: it is persisted alongside the
/// tokens and handed back to consumers, never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "profilePictureUrl", default)]
    pub profile_picture_url: Option<String>,
    #[serde(rename = "youtubeLinks", default)]
    pub youtube_links: Vec<YoutubeLink>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

/// A shared YouTube video on a user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoutubeLink {
    pub id: String,
    #[serde(rename = "videoId", default)]
    pub video_id: Option<String>,
    pub title: String,
    pub url: String,
    #[serde(rename = "addedAt", default)]
    pub added_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_with_links() {
        let json = r#"{
            "id": "u1",
            "name": "Ada",
            "email": "ada@example.com",
            "profilePictureUrl": "https://cdn.example.com/ada.png",
            "youtubeLinks": [
                {"id": "l1", "videoId": "dQw4w9WgXcQ", "title": "First", "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ", "addedAt": "2024-05-01T12:00:00Z"}
            ]
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.youtube_links.len(), 1);
        assert_eq!(user.youtube_links[0].video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert!(user.bio.is_none());
    }

    #[test]
    fn test_parse_minimal_user() {
        let json = r#"{"id": "u2", "name": "Bo", "email": "bo@example.com"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.youtube_links.is_empty());
        assert!(user.created_at.is_none());
    }
}
