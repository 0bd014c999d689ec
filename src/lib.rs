//! Client for the Authsignal API.
//!
//! Every operation comes in two flavors:
//! - `get_user`, `track`, ... return an [`ApiResponse`]; a failure reported by the
//!   API is a value, not an error.
//! - `get_user_strict`, `track_strict`, ... return the same successful response but
//!   turn an API failure into an [`ApiError`].
//!
//! Both flavors propagate transport failures (connection errors, timeouts) and
//! [`ArgumentError`]s as errors.
//!
//! The crate-level functions use the process-wide configuration managed by
//! [`setup`]; build a [`Client`] for an independent one.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! authsignal::setup(|config| config.api_secret_key = Some("secret".into()));
//!
//! let user = authsignal::get_user("abc", None).await?;
//! if user.is_success() {
//!     println!("{:?}", user.get("email"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod http;
pub mod operations;
pub mod response;

pub use client::Client;
pub use config::{Configuration, RetryPolicy, configuration, default_configuration, setup};
pub use error::{ApiError, ArgumentError};
pub use event::TrackEvent;
pub use operations::shared::*;
pub use operations::{OPERATIONS, Operation, RAISING_SUFFIX, find_operation, raise_on_failure};
pub use response::ApiResponse;
