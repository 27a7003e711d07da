//! Error handling for the portal client
//!
//! Centralized error type for HTTP calls, decoding, and panel operations.

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

/// Message shown to the user when a write action fails
pub const GENERIC_APOLOGY: &str = "Sorry, something went wrong. Please try again.";

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// Backend answered with a non-success status
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Forbidden for role {0}")]
    Forbidden(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Reply contained no text")]
    EmptyReply,

    #[error("Token store error: {0}")]
    TokenStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Build the error raised for a non-success response.
    ///
    /// The message comes from the body's `message` field when present.
    pub fn from_response(status: StatusCode, body: Option<&serde_json::Value>) -> Self {
        let message = body
            .and_then(|b| b.get("message"))
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| format!("HTTP error: {}", status.as_u16()), str::to_string);

        ClientError::Http { status, message }
    }

    pub fn validation(message: &str) -> Self {
        ClientError::Validation(message.to_string())
    }

    pub fn forbidden(role: impl std::fmt::Display) -> Self {
        ClientError::Forbidden(role.to_string())
    }

    /// HTTP status of the failed call, if the backend answered
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Get error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Http { .. } => "HttpError",
            ClientError::Network(_) => "NetworkError",
            ClientError::Decode(_) => "DecodeError",
            ClientError::InvalidUrl(_) => "InvalidUrl",
            ClientError::Validation(_) => "ValidationError",
            ClientError::Unauthenticated => "Unauthenticated",
            ClientError::Forbidden(_) => "Forbidden",
            ClientError::Cancelled => "Cancelled",
            ClientError::EmptyReply => "EmptyReply",
            ClientError::TokenStore(_) => "TokenStoreError",
            ClientError::Io(_) => "IoError",
            ClientError::Config(_) => "ConfigError",
        }
    }

    /// Check if the backend side is at fault
    pub fn is_server_error(&self) -> bool {
        match self {
            ClientError::Http { status, .. } => status.is_server_error(),
            ClientError::Network(_) | ClientError::Decode(_) | ClientError::EmptyReply => true,
            _ => false,
        }
    }

    /// Cancellation is not a failure; panels drop the result silently.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// Text for the blocking alert shown on a failed action.
    ///
    /// Validation problems are the user's to fix and are shown verbatim.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(message) => message.clone(),
            ClientError::Unauthenticated => "Please sign in to continue.".to_string(),
            ClientError::Forbidden(_) => "You do not have access to this action.".to_string(),
            _ => GENERIC_APOLOGY.to_string(),
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
