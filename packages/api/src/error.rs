//! Error type shared by every backend call.

/// Failure of a remote call.
///
/// `Clone` so fakes can replay the same failure; transport errors are kept
/// as their display string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Credential or account problem, message as given by the auth service.
    #[error("{0}")]
    Auth(String),

    #[error("You are not signed in")]
    NotAuthenticated,

    #[error("{0} not found")]
    NotFound(String),

    /// The response body did not match the expected schema.
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether retrying the same read may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Http {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::Network("reset".into()).is_transient());
        assert!(ApiError::Http { status: 503, message: String::new() }.is_transient());
        assert!(ApiError::Http { status: 429, message: String::new() }.is_transient());
        assert!(!ApiError::Http { status: 404, message: String::new() }.is_transient());
        assert!(!ApiError::Auth("Invalid login credentials".into()).is_transient());
        assert!(!ApiError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn test_auth_message_is_verbatim() {
        let e = ApiError::Auth("User already registered".to_string());
        assert_eq!(e.to_string(), "User already registered");
    }
}
