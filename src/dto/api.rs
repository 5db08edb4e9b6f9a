//! DTOs exposed by the loaner API endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::device::Device;

/// Query parameters accepted by `/api/v1/devices`.
#[derive(Debug, Default, Deserialize)]
pub struct DevicesApiQuery {
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub total: usize,
    pub devices: Vec<Device>,
}

/// Devices trimmed to the requested fields.
#[derive(Debug, Serialize)]
pub struct DeviceSearchResponse {
    pub total: usize,
    pub devices: Vec<Value>,
}

/// Query parameters accepted by `/api/v1/search/suggestions`.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsQuery {
    #[serde(default)]
    pub q: String,
}
