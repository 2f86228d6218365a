use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = body
                .char_indices()
                .take_while(|(i, _)| *i < MAX_ERROR_BODY_LENGTH)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// Extract the backend's `message` field when the body is JSON,
    /// otherwise fall back to the raw (truncated) body. The backend
    /// reports business errors as `{"message": "..."}` and the UI
    /// forwards that text verbatim.
    fn extract_message(body: &str) -> String {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            message: Option<String>,
        }
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            if let Some(message) = parsed.message {
                if !message.is_empty() {
                    return message;
                }
            }
        }
        Self::truncate_body(body)
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_extracts_message_field() {
        let body = r#"{"success": false, "message": "ไม่พบข้อมูลศิษย์เก่า"}"#;
        let err = ApiError::from_status(reqwest::StatusCode::NOT_FOUND, body);
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "ไม่พบข้อมูลศิษย์เก่า"),
            other => panic!("unexpected error variant: {:?}", other),
        }
    }

    #[test]
    fn test_from_status_unauthorized() {
        let err = ApiError::from_status(reqwest::StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_from_status_falls_back_to_body() {
        let err = ApiError::from_status(reqwest::StatusCode::BAD_REQUEST, "plain text");
        match err {
            ApiError::InvalidResponse(msg) => assert!(msg.contains("plain text")),
            other => panic!("unexpected error variant: {:?}", other),
        }
    }

    #[test]
    fn test_truncate_body_respects_utf8() {
        let long = "สมาคมศิษย์เก่า".repeat(50);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated"));
    }
}
