//! Tracking events and their local validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ArgumentError;

/// An action performed by a user, sent to the API for risk evaluation.
///
/// `user_id` and `action` become path segments. Everything else (`redirect_url`,
/// `email`, `custom`, ...) goes in `attributes` and is sent as the request body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackEvent {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub action: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl TrackEvent {
    pub fn new(user_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            action: action.into(),
            attributes: Map::new(),
        }
    }

    pub fn attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Checks the fields that must be present before anything is sent.
    pub fn validate(&self) -> Result<(), ArgumentError> {
        if self.action.is_empty() {
            return Err(ArgumentError::MissingAction);
        }
        if self.user_id.is_empty() {
            return Err(ArgumentError::MissingUserId);
        }
        Ok(())
    }

    pub fn body(&self) -> Value {
        Value::Object(self.attributes.clone())
    }
}
