//! Axum adapter for NextPaste: the HTTP control API used by the web UI.
//!
//! Handlers are thin; every operation goes through
//! [`nextpaste_runtime::SyncService`]. Runtime events reach the browser
//! through the [`sse::SseBroadcaster`].

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sse;
pub mod state;

pub use bootstrap::{AxumContext, CorsConfig, WebConfig, bootstrap, start_server};
pub use error::HttpError;
pub use routes::{create_router, create_spa_router};
pub use sse::SseBroadcaster;
pub use state::AppState;
