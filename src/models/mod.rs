//! Database and request models shared across the loaner application.

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod config;
pub mod device;
pub mod device_event;
pub mod shelf;
