use reqwest::Method;
use serde_json::Value;

/// One outbound API call: target, path segments, query and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path segments relative to the API base URL. Each one is percent-encoded on send.
    pub path: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new<I, S>(method: Method, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            path: path.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, path)
    }

    pub fn post<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, path)
    }

    pub fn delete<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Slash-joined path, for logging.
    pub fn display_path(&self) -> String {
        self.path.join("/")
    }
}

/// What the transport hands back for a completed exchange.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawResponse {
    /// `None` when no status is available.
    pub status: Option<u16>,
    /// Parsed JSON body, `None` when empty or not JSON.
    pub body: Option<Value>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }
}
