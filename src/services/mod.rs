pub mod actions;
pub mod api;
pub mod devices;
pub mod errors;
pub mod search;
pub mod shelves;
pub mod status;

pub use errors::{ServiceError, ServiceResult};
