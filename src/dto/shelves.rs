//! DTOs used in shelf administration pages.

use serde::{Deserialize, Serialize};

use crate::domain::shelf::Shelf;
use crate::pagination::Paginated;

/// Query parameters accepted by the shelves page.
#[derive(Debug, Default, Deserialize)]
pub struct ShelvesQuery {
    pub search: Option<String>,
    pub page: Option<usize>,
}

/// Shelf with its occupancy and canonical search query.
#[derive(Debug, Serialize)]
pub struct ShelfRow {
    pub shelf: Shelf,
    pub device_count: usize,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ShelvesPageData {
    pub shelves: Paginated<ShelfRow>,
    pub search_query: Option<String>,
}
