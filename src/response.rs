//! Normalization of HTTP outcomes into a uniform, success-tagged result.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::http::RawResponse;

/// Status reported when a failed exchange produced no status at all.
pub const FALLBACK_STATUS: u16 = 500;

/// Result envelope returned by every non-raising operation.
///
/// Only the envelope is typed. Body fields vary per operation and per error
/// code and stay an open map.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Success { fields: Map<String, Value> },
    Failure { fields: Map<String, Value>, status: u16 },
}

impl ApiResponse {
    /// Normalizes a raw response.
    ///
    /// A successful body passes through untouched. A failed body is kept when it is
    /// a JSON object and dropped otherwise, leaving only the status.
    pub fn from_raw(raw: RawResponse) -> Self {
        if raw.is_success() {
            let fields = match raw.body {
                Some(Value::Object(map)) => map,
                // Non-object success bodies are not produced by the API; keep them reachable.
                Some(other) => Map::from_iter([("body".to_string(), other)]),
                None => Map::new(),
            };
            return ApiResponse::Success { fields };
        }

        let status = raw.status.unwrap_or(FALLBACK_STATUS);
        match raw.body {
            Some(Value::Object(fields)) => ApiResponse::Failure { fields, status },
            _ => ApiResponse::Failure {
                fields: Map::new(),
                status,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    /// HTTP status of a failure, `None` on success.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiResponse::Success { .. } => None,
            ApiResponse::Failure { status, .. } => Some(*status),
        }
    }

    /// Body fields, without the `success` and `status` envelope keys.
    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            ApiResponse::Success { fields } | ApiResponse::Failure { fields, .. } => fields,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields().get(key)
    }

    /// Error code reported by the API.
    pub fn error(&self) -> Option<&str> {
        self.get("error").and_then(Value::as_str)
    }

    pub fn error_description(&self) -> Option<&str> {
        self.get("error_description").and_then(Value::as_str)
    }

    /// Flattens the envelope into one map: body fields plus `success`, and `status` on failure.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.fields().clone();
        if let Some(status) = self.status() {
            map.insert("status".to_string(), Value::from(status));
        }
        map.insert("success".to_string(), Value::Bool(self.is_success()));
        map
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.to_map())
    }
}

impl Serialize for ApiResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}
