//! HTTP handlers, one module per resource.

pub mod clients;
pub mod events;
pub mod logs;
pub mod network;
pub mod server;
pub mod settings;
