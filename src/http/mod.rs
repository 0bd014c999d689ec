//! HTTP transport with retry logic and JSON key-case conversion.

mod case;
mod client;
mod retry;
mod types;

pub use case::{camelize_keys, snakeize_keys};
#[cfg(test)]
pub use client::MockTransport;
pub use client::{HttpTransport, Transport, USER_AGENT};
pub use retry::{is_transient, with_retry};
pub use types::{ApiRequest, RawResponse};
