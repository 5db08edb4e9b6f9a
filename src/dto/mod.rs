//! DTO modules that bridge services with templates and APIs.

pub mod api;
pub mod devices;
pub mod search;
pub mod shelves;
pub mod status;
