//! One handler module per subcommand.

pub mod config;
pub mod connect;
pub mod ips;
pub mod relay;
pub mod serve;
pub mod web;
