use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ShelfCapacity, ShelfId, ShelfLocation};

/// Physical location holding devices that are not on loan.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Shelf {
    pub id: ShelfId,
    pub location: ShelfLocation,
    pub friendly_name: Option<String>,
    pub capacity: ShelfCapacity,
    pub enabled: bool,
    pub created_at: NaiveDateTime,
}

impl Shelf {
    /// Label shown in lists: the friendly name when set, the location otherwise.
    pub fn display_name(&self) -> &str {
        self.friendly_name
            .as_deref()
            .unwrap_or_else(|| self.location.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct NewShelf {
    pub location: ShelfLocation,
    pub friendly_name: Option<String>,
    pub capacity: ShelfCapacity,
}

impl NewShelf {
    #[must_use]
    pub fn new(
        location: ShelfLocation,
        friendly_name: Option<String>,
        capacity: ShelfCapacity,
    ) -> Self {
        Self {
            location,
            friendly_name: friendly_name
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            capacity,
        }
    }
}
