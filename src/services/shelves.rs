//! Services handling shelf administration.

use crate::SERVICE_ADMIN_ROLE;
use crate::domain::query::to_query;
use crate::domain::shelf::{NewShelf, Shelf};
use crate::domain::types::ShelfId;
use crate::dto::shelves::{ShelfRow, ShelvesPageData, ShelvesQuery};
use crate::forms::shelves::AddShelfForm;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{ShelfListQuery, ShelfReader, ShelfWriter};
use crate::routes::ensure_role;
use crate::services::{ServiceError, ServiceResult};

/// Pairs each shelf with its device count and canonical query string.
pub fn shelf_rows<R>(repo: &R, shelves: Vec<Shelf>) -> ServiceResult<Vec<ShelfRow>>
where
    R: ShelfReader + ?Sized,
{
    shelves
        .into_iter()
        .map(|shelf| {
            Ok(ShelfRow {
                device_count: repo.count_devices_on_shelf(shelf.id)?,
                query: to_query(&shelf),
                shelf,
            })
        })
        .collect()
}

pub fn list_shelves<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ShelvesQuery,
) -> ServiceResult<ShelvesPageData>
where
    R: ShelfReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let page = query.page.unwrap_or(1);
    let search_query = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let mut list_query = ShelfListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = &search_query {
        list_query = list_query.search(term);
    }

    let (total, shelves) = repo.list_shelves(list_query)?;
    let rows = shelf_rows(repo, shelves)?;

    Ok(ShelvesPageData {
        shelves: Paginated::new(rows, page, total, DEFAULT_ITEMS_PER_PAGE),
        search_query,
    })
}

pub fn add_shelf<R>(repo: &R, user: &AuthenticatedUser, form: AddShelfForm) -> ServiceResult<Shelf>
where
    R: ShelfWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let new_shelf = NewShelf::try_from(form)?;

    repo.create_shelf(&new_shelf).map_err(|err| {
        log::error!("Failed to add shelf {}: {err}", new_shelf.location);
        ServiceError::from(err)
    })
}

/// Flips the enabled flag; disabled shelves are hidden from enrollment.
pub fn toggle_shelf<R>(repo: &R, user: &AuthenticatedUser, shelf_id: i32) -> ServiceResult<Shelf>
where
    R: ShelfReader + ShelfWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let shelf = repo
        .get_shelf_by_id(ShelfId::new(shelf_id)?)?
        .ok_or(ServiceError::NotFound)?;

    Ok(repo.set_shelf_enabled(shelf.id, !shelf.enabled)?)
}
