//! Repository implementation for shelves.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::{
    domain::{
        shelf::{NewShelf, Shelf},
        types::ShelfId,
    },
    models::shelf::{NewShelf as DbNewShelf, Shelf as DbShelf},
    repository::errors::{RepositoryError, RepositoryResult},
    repository::{DieselRepository, ShelfListQuery, ShelfReader, ShelfWriter, contains_pattern},
    schema::{devices, shelves},
};

fn filtered_shelves(query: &ShelfListQuery) -> shelves::BoxedQuery<'static, Sqlite> {
    let mut items = shelves::table.into_boxed();

    if query.enabled_only {
        items = items.filter(shelves::enabled.eq(true));
    }

    let Some(search) = &query.search else {
        return items;
    };

    for filter in &search.filters {
        items = match filter.field.as_str() {
            "location" => items.filter(shelves::location.eq(filter.value.clone())),
            "capacity" => match filter.as_i32() {
                Some(capacity) => items.filter(shelves::capacity.eq(capacity)),
                None => items,
            },
            "enabled" => match filter.as_bool() {
                Some(enabled) => items.filter(shelves::enabled.eq(enabled)),
                None => items,
            },
            _ => items,
        };
    }

    if let Some(text) = &search.text {
        let pattern = contains_pattern(text);
        items = items.filter(
            shelves::location
                .like(pattern.clone())
                .escape('\\')
                .or(shelves::friendly_name.like(pattern).escape('\\')),
        );
    }

    items
}

impl ShelfReader for DieselRepository {
    fn get_shelf_by_id(&self, id: ShelfId) -> RepositoryResult<Option<Shelf>> {
        let mut conn = self.conn()?;
        let shelf = shelves::table
            .find(id.get())
            .first::<DbShelf>(&mut conn)
            .optional()?;

        match shelf {
            Some(shelf) => Ok(Some(Shelf::try_from(shelf)?)),
            None => Ok(None),
        }
    }

    fn list_shelves(&self, query: ShelfListQuery) -> RepositoryResult<(usize, Vec<Shelf>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_shelves(&query).count().get_result(&mut conn)?;

        let mut items = filtered_shelves(&query).order(shelves::location.asc());
        if let Some(pagination) = &query.pagination {
            let (limit, offset) = pagination.limit_offset();
            items = items.limit(limit).offset(offset);
        }

        let shelves = items
            .load::<DbShelf>(&mut conn)?
            .into_iter()
            .map(|shelf| Shelf::try_from(shelf).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, shelves))
    }

    fn count_devices_on_shelf(&self, id: ShelfId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let count: i64 = devices::table
            .filter(devices::shelf_id.eq(id.get()))
            .count()
            .get_result(&mut conn)?;
        Ok(count as usize)
    }
}

impl ShelfWriter for DieselRepository {
    fn create_shelf(&self, new_shelf: &NewShelf) -> RepositoryResult<Shelf> {
        let mut conn = self.conn()?;
        let insertable: DbNewShelf = new_shelf.into();
        let shelf = diesel::insert_into(shelves::table)
            .values(&insertable)
            .get_result::<DbShelf>(&mut conn)?;
        Ok(Shelf::try_from(shelf)?)
    }

    fn set_shelf_enabled(&self, id: ShelfId, enabled: bool) -> RepositoryResult<Shelf> {
        let mut conn = self.conn()?;
        let shelf = diesel::update(shelves::table.find(id.get()))
            .set(shelves::enabled.eq(enabled))
            .get_result::<DbShelf>(&mut conn)?;
        Ok(Shelf::try_from(shelf)?)
    }
}
