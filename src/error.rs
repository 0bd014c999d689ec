//! Error types surfaced by API operations.
//!
//! Operations return `anyhow::Result`; these types travel inside the `anyhow::Error`
//! and can be recovered with `downcast_ref`. Transport failures keep their
//! underlying `reqwest::Error`.

use std::fmt;

use crate::response::ApiResponse;

const UNEXPECTED_ERROR: &str = "An unexpected API error occurred";

/// Business failure reported by the API, raised by the `_strict` operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error code reported by the API. Same value as `code`.
    pub name: Option<String>,
    pub status: u16,
    pub code: Option<String>,
    pub description: Option<String>,
}

impl ApiError {
    /// Builds the error from a failed result.
    ///
    /// The API returns a single `error` field, so it fills both `name` and `code`.
    pub fn from_response(response: &ApiResponse) -> Self {
        let code = response.error().map(str::to_string);
        Self {
            name: code.clone(),
            status: response.status().unwrap_or(500),
            code,
            description: response.error_description().map(str::to_string),
        }
    }

    pub fn message(&self) -> &str {
        self.description
            .as_deref()
            .or(self.code.as_deref())
            .unwrap_or(UNEXPECTED_ERROR)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.status, self.message())
    }
}

impl std::error::Error for ApiError {}

/// Invalid arguments caught before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    MissingAction,
    MissingUserId,
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentError::MissingAction => write!(f, "Action Code is required"),
            ArgumentError::MissingUserId => write!(f, "User ID value is required"),
        }
    }
}

impl std::error::Error for ArgumentError {}
