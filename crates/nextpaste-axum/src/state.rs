//! Shared state for Axum handlers.

use std::sync::Arc;

use crate::bootstrap::AxumContext;

/// Handler state: the composed context behind an `Arc`.
pub type AppState = Arc<AxumContext>;
