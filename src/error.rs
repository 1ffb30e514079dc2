//! Error handling for the CRM client

use std::fmt;
use thiserror::Error;

/// Unified error type for the CRM client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors, including timeouts
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The API answered with `success: false`
    #[error("API error: {0}")]
    Api(String),

    /// No session, or the session has no resolved user
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A required field was missing before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// The current role may not perform the action
    #[error("Permission error: {0}")]
    Permission(String),

    /// Token store errors
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Error taxonomy as seen by the views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never reached the server or the answer was unreadable
    Connection,
    /// Well-formed answer reporting a failure
    Api,
    /// Caught locally before any request
    Local,
}

impl Error {
    /// Create a new API error
    pub fn api<T: fmt::Display>(msg: T) -> Self {
        Error::Api(msg.to_string())
    }

    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new permission error
    pub fn permission<T: fmt::Display>(msg: T) -> Self {
        Error::Permission(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Which class of failure this is
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http(_) | Error::Json(_) | Error::Url(_) => ErrorKind::Connection,
            Error::Api(_) | Error::Auth(_) => ErrorKind::Api,
            Error::Validation(_) | Error::Permission(_) | Error::Storage(_) => ErrorKind::Local,
        }
    }

    /// Text shown in a banner or modal
    pub fn user_message(&self) -> String {
        match self {
            Error::Http(e) if e.is_timeout() => "Connection error: request timed out".to_string(),
            Error::Http(e) => format!("Connection error: {}", e),
            Error::Json(e) => format!("Connection error: unreadable response ({})", e),
            Error::Url(e) => format!("Connection error: {}", e),
            Error::Api(msg)
            | Error::Auth(msg)
            | Error::Validation(msg)
            | Error::Permission(msg)
            | Error::Storage(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Error::api("nope").kind(), ErrorKind::Api);
        assert_eq!(Error::auth("Not logged in").kind(), ErrorKind::Api);
        assert_eq!(Error::validation("Name is required").kind(), ErrorKind::Local);
        assert_eq!(Error::permission("denied").kind(), ErrorKind::Local);
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::from(json_err).kind(), ErrorKind::Connection);
    }

    #[test]
    fn test_user_message_is_raw_api_text() {
        assert_eq!(Error::api("Credenciales inválidas").user_message(), "Credenciales inválidas");
        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        assert!(Error::from(json_err).user_message().starts_with("Connection error"));
    }
}
