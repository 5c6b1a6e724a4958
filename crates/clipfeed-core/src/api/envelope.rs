use serde::Deserialize;

/// The documented response envelope: `{success, message?, data?, pagination?}`.
///
/// Typed once here so downstream code matches on fields instead of probing
/// raw JSON. A 2xx response with `success: false` is an application-level
/// rejection and reaches the caller inside the envelope, not as a transport
/// error.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    /// Application-level outcome: the payload on success, the server's
    /// message otherwise.
    pub fn into_result(self) -> Result<T, String> {
        if self.success {
            self.data
                .ok_or_else(|| "response reported success but carried no data".to_string())
        } else {
            Err(self
                .message
                .unwrap_or_else(|| "Something went wrong".to_string()))
        }
    }
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "totalPages", default)]
    pub total_pages: u64,
    #[serde(rename = "currentPage", default)]
    pub current_page: u64,
    #[serde(rename = "hasNextPage", default)]
    pub has_next_page: bool,
    #[serde(rename = "hasPreviousPage", default)]
    pub has_previous_page: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_yields_data() {
        let json = r#"{"success": true, "data": {"value": 7}}"#;
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(json).unwrap();
        let data = envelope.into_result().unwrap();
        assert_eq!(data["value"], 7);
    }

    #[test]
    fn test_failure_envelope_yields_message() {
        let json = r#"{"success": false, "message": "Invalid credentials"}"#;
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.into_result().unwrap_err(), "Invalid credentials");
    }

    #[test]
    fn test_failure_envelope_without_message_is_generic() {
        let json = r#"{"success": false}"#;
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.into_result().unwrap_err(), "Something went wrong");
    }

    #[test]
    fn test_pagination_parses_wire_names() {
        let json = r#"{
            "success": true,
            "data": [],
            "pagination": {"total": 40, "totalPages": 4, "currentPage": 2, "hasNextPage": true, "hasPreviousPage": true}
        }"#;
        let envelope: Envelope<Vec<serde_json::Value>> = serde_json::from_str(json).unwrap();
        let pagination = envelope.pagination.unwrap();
        assert_eq!(pagination.total_pages, 4);
        assert!(pagination.has_next_page);
    }
}
