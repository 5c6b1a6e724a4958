use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session expired. Please login again.")]
    SessionExpired,

    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data in messages
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Classify a non-2xx response, extracting the documented `message` field
    /// from the body when present.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let message = error_message(body)
            .map(|m| Self::truncate_body(&m))
            .unwrap_or_else(|| "Something went wrong".to_string());
        ApiError::RequestFailed {
            status: status.as_u16(),
            message,
        }
    }
}

/// Pull the `message` field out of a JSON error body, if there is one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("message")?.as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_extracted_from_json_body() {
        let err = ApiError::from_response(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"success": false, "message": "User not found"}"#,
        );
        match err {
            ApiError::RequestFailed { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "User not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_json_body_falls_back_to_generic() {
        let err = ApiError::from_response(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "<html>oops</html>",
        );
        match err {
            ApiError::RequestFailed { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Something went wrong");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_long_message_is_truncated() {
        let long = "x".repeat(2000);
        let body = format!(r#"{{"message": "{}"}}"#, long);
        let err = ApiError::from_response(reqwest::StatusCode::BAD_REQUEST, &body);
        match err {
            ApiError::RequestFailed { message, .. } => {
                assert!(message.len() < 600);
                assert!(message.contains("truncated"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
