//! Error handling for the workforce client

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::forms::ValidationErrors;

/// Error body returned by PostgREST or Supabase Auth when a request is rejected.
///
/// Auth bodies carry a numeric `code` and put the text in `msg` or
/// `error_description`; both shapes land in the same fields.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrorDetails {
    #[serde(default, deserialize_with = "code_text")]
    pub code: Option<String>,
    #[serde(default, alias = "msg", alias = "error_description")]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

fn code_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(code)) => Some(code),
        Some(serde_json::Value::Number(code)) => Some(code.to_string()),
        _ => None,
    })
}

impl fmt::Display for ApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("Code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(format!("Message: {}", message));
        }
        if let Some(details) = &self.details {
            parts.push(format!("Details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}", hint));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Unified error type for the workforce client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The store rejected the request
    #[error("API error: {details} (Status: {status})")]
    Api {
        details: ApiErrorDetails,
        status: StatusCode,
    },

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Database errors that are not a rejected request, such as an empty result
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Form values failed validation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// A mutation for this form is already in flight
    #[error("A submission is already in progress")]
    Busy,

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new database error
    pub fn database<T: fmt::Display>(msg: T) -> Self {
        Error::Database(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// Build an API error from a raw response body.
    ///
    /// Bodies that are not PostgREST error objects become the message.
    pub fn from_response_body(status: StatusCode, body: &str) -> Self {
        let details = serde_json::from_str::<ApiErrorDetails>(body)
            .ok()
            .filter(|d| d.message.is_some() || d.code.is_some())
            .unwrap_or_else(|| ApiErrorDetails {
                message: (!body.trim().is_empty()).then(|| body.trim().to_string()),
                ..Default::default()
            });
        Error::Api { details, status }
    }

    /// The message to show the user, when there is one.
    ///
    /// For rejected requests this is the store's own message. Other remote
    /// failures use their display text. Local programmer-facing errors return
    /// `None` so callers fall back to a generic text.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Error::Api { details, .. } => details.message.clone(),
            Error::Http(e) => Some(e.to_string()),
            Error::Auth(msg) | Error::Database(msg) | Error::General(msg) => Some(msg.clone()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_postgrest_error_body() {
        let body = r#"{"code":"42501","message":"permission denied for table tasks","details":null,"hint":null}"#;
        let err = Error::from_response_body(StatusCode::FORBIDDEN, body);

        assert_eq!(
            err.user_message().as_deref(),
            Some("permission denied for table tasks")
        );
        match err {
            Error::Api { details, status } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(details.code.as_deref(), Some("42501"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn plain_text_body_becomes_message() {
        let err = Error::from_response_body(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(err.user_message().as_deref(), Some("upstream down"));
    }

    #[test]
    fn empty_body_has_no_message() {
        let err = Error::from_response_body(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.user_message(), None);
    }

    #[test]
    fn local_errors_have_no_user_message() {
        assert_eq!(Error::Busy.user_message(), None);
        assert_eq!(
            Error::Validation(ValidationErrors::default()).user_message(),
            None
        );
    }

    #[test]
    fn parses_auth_error_body_with_numeric_code() {
        let body = r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#;
        let err = Error::from_response_body(StatusCode::BAD_REQUEST, body);

        assert_eq!(
            err.user_message().as_deref(),
            Some("Invalid login credentials")
        );
        match err {
            Error::Api { details, .. } => assert_eq!(details.code.as_deref(), Some("400")),
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn parses_oauth_style_error_body() {
        let body = r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#;
        let err = Error::from_response_body(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.user_message().as_deref(), Some("Email not confirmed"));
    }
}
