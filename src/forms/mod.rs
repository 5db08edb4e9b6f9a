//! Form definitions backing the loaner routes.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use validator::ValidationErrors;

pub mod actions;
pub mod devices;
pub mod search;
pub mod shelves;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid serial number")]
    InvalidSerialNumber,

    #[error("invalid asset tag")]
    InvalidAssetTag,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid date")]
    InvalidDate,

    #[error("due date is after the maximum extend date")]
    InvalidDateRange,

    #[error("invalid shelf location")]
    InvalidLocation,

    #[error("invalid shelf capacity")]
    InvalidCapacity,

    #[error("invalid shelf id")]
    InvalidShelfId,

    #[error("invalid device id")]
    InvalidDeviceId,

    #[error("damaged reason is required")]
    InvalidReason,

    #[error("unknown device action: {0}")]
    UnknownAction(String),

    #[error("action was not confirmed")]
    NotConfirmed,

    #[error("malformed CSV: {0}")]
    Csv(String),
}

/// Parses `datetime-local` (`2017-04-01T09:30`) or `date` (`2017-04-01`) input values.
///
/// Plain dates resolve to midnight.
pub(crate) fn parse_form_date(value: &str) -> Result<NaiveDateTime, FormError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|_| FormError::InvalidDate)
}

/// Treats blank optional inputs as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
