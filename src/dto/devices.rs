//! DTOs shaped for the device list and detail templates.

use serde::Deserialize;

use crate::domain::device::Device;
use crate::domain::device_event::DeviceEvent;
use crate::domain::shelf::Shelf;
use crate::pagination::Paginated;

/// Query parameters accepted by the devices page.
#[derive(Debug, Default, Deserialize)]
pub struct DevicesQuery {
    /// Raw search string, `field:value` terms allowed.
    pub search: Option<String>,
    pub page: Option<usize>,
}

pub struct DevicesPageData {
    pub devices: Paginated<Device>,
    pub search_query: Option<String>,
    /// Enabled shelves offered by the enroll form.
    pub shelves: Vec<Shelf>,
}

/// Aggregated data required to render the device details page.
pub struct DevicePageData {
    pub device: Device,
    pub shelf: Option<Shelf>,
    pub events: Paginated<DeviceEvent>,
    pub shelves: Vec<Shelf>,
}
