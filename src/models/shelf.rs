//! Diesel models for shelves.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::shelf::{NewShelf as DomainNewShelf, Shelf as DomainShelf};
use crate::domain::types::{ShelfCapacity, ShelfId, ShelfLocation, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::shelves)]
pub struct Shelf {
    pub id: i32,
    pub location: String,
    pub friendly_name: Option<String>,
    pub capacity: i32,
    pub enabled: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::shelves)]
pub struct NewShelf<'a> {
    pub location: &'a str,
    pub friendly_name: Option<&'a str>,
    pub capacity: i32,
}

impl TryFrom<Shelf> for DomainShelf {
    type Error = TypeConstraintError;

    fn try_from(shelf: Shelf) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ShelfId::new(shelf.id)?,
            location: ShelfLocation::new(shelf.location)?,
            friendly_name: shelf.friendly_name,
            capacity: ShelfCapacity::new(shelf.capacity)?,
            enabled: shelf.enabled,
            created_at: shelf.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewShelf> for NewShelf<'a> {
    fn from(shelf: &'a DomainNewShelf) -> Self {
        Self {
            location: shelf.location.as_str(),
            friendly_name: shelf.friendly_name.as_deref(),
            capacity: shelf.capacity.get(),
        }
    }
}
