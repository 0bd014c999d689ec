//! API client: binds a transport to a configuration source.

use std::sync::OnceLock;

use anyhow::Result;
use log::debug;

use crate::config::{self, Configuration};
use crate::http::{ApiRequest, HttpTransport, Transport};
use crate::response::ApiResponse;

/// Client for the Authsignal API.
///
/// The operations themselves (`get_user`, `track`, ...) and their `_strict`
/// counterparts live in [`crate::operations`].
pub struct Client<T: Transport = HttpTransport> {
    transport: T,
    /// Pinned configuration. `None` reads the process-wide one on every call.
    config: Option<Configuration>,
}

impl Client<HttpTransport> {
    /// Client that follows the process-wide configuration, including later
    /// [`crate::setup`] changes.
    pub fn new() -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new()?, None))
    }

    /// Client with its own configuration, independent of the process-wide one.
    pub fn with_config(config: Configuration) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new()?, Some(config)))
    }

    /// Lazily built client shared by the crate-level operation functions.
    pub fn shared() -> Result<&'static Self> {
        static SHARED: OnceLock<Client> = OnceLock::new();

        if let Some(client) = SHARED.get() {
            return Ok(client);
        }
        let client = Self::new()?;
        Ok(SHARED.get_or_init(|| client))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T, config: Option<Configuration>) -> Self {
        Self { transport, config }
    }

    /// Configuration in effect for the next call.
    pub fn config(&self) -> Configuration {
        match &self.config {
            Some(config) => config.clone(),
            None => config::configuration(),
        }
    }

    /// Sends one request and normalizes whatever comes back.
    ///
    /// Transport errors propagate untouched.
    pub(crate) async fn dispatch(
        &self,
        operation: &str,
        request: ApiRequest,
    ) -> Result<ApiResponse> {
        let config = self.config();
        debug!("{}: {} {}", operation, request.method, request.display_path());

        let raw = self.transport.send(&config, &request).await?;
        let response = ApiResponse::from_raw(raw);

        if !response.is_success() {
            debug!("{}: failed with status {:?}", operation, response.status());
        }
        Ok(response)
    }
}
