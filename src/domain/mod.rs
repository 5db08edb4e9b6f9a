//! Domain aggregates exposed by the loaner service layer.

pub mod action;
pub mod device;
pub mod device_event;
pub mod loan;
pub mod query;
pub mod search;
pub mod shelf;
pub mod types;
