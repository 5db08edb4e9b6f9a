use serde::Serialize;

use crate::domain::device::Device;
use crate::domain::search::EntityKind;
use crate::dto::shelves::ShelfRow;
use crate::pagination::Paginated;

/// Search results for one entity kind.
#[derive(Debug, Serialize)]
pub struct SearchResultsData {
    pub kind: EntityKind,
    pub query: String,
    /// Percent-encoded results path, the base for page links.
    pub url: String,
    pub devices: Option<Paginated<Device>>,
    pub shelves: Option<Paginated<ShelfRow>>,
}
