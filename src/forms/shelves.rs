use serde::Deserialize;
use validator::Validate;

use crate::domain::shelf::NewShelf;
use crate::domain::types::{ShelfCapacity, ShelfLocation};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
/// Form data for adding a shelf.
pub struct AddShelfForm {
    #[validate(length(min = 1, max = 128))]
    pub location: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: i32,
}

impl TryFrom<AddShelfForm> for NewShelf {
    type Error = FormError;

    fn try_from(form: AddShelfForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let location = ShelfLocation::new(form.location).map_err(|_| FormError::InvalidLocation)?;
        let capacity = ShelfCapacity::new(form.capacity).map_err(|_| FormError::InvalidCapacity)?;

        Ok(NewShelf::new(location, non_blank(form.friendly_name), capacity))
    }
}
