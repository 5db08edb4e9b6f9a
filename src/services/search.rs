//! Search box dispatch and result pages.

use crate::SERVICE_ADMIN_ROLE;
use crate::domain::search::{
    EntityKind, NavigationRequest, Navigator, SearchDispatcher, Suggestion,
};
use crate::dto::search::SearchResultsData;
use crate::forms::search::SearchForm;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{DeviceListQuery, DeviceReader, ShelfListQuery, ShelfReader};
use crate::routes::ensure_role;
use crate::services::ServiceResult;
use crate::services::shelves::shelf_rows;

/// Navigator that keeps the request it was handed.
#[derive(Debug, Default)]
pub struct PendingNavigation {
    pub request: Option<NavigationRequest>,
}

impl Navigator for PendingNavigation {
    fn navigate(&mut self, request: NavigationRequest) {
        self.request = Some(request);
    }
}

/// Runs the search box for a submitted form.
///
/// Returns the searched entity kind with its navigation; `None` means there
/// was nothing to search and no navigation happened.
pub fn resolve_search(
    user: &AuthenticatedUser,
    form: &SearchForm,
) -> ServiceResult<Option<(EntityKind, NavigationRequest)>> {
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let mut dispatcher = SearchDispatcher::new(form.q.as_str());
    let mut navigation = PendingNavigation::default();
    if !dispatcher.trigger(form.trigger(), &mut navigation) {
        log::debug!("Search for {:?} dispatched nothing", form.q);
    }

    Ok(navigation
        .request
        .map(|request| (dispatcher.entity_kind, request)))
}

/// Autocomplete entries for `text`.
pub fn suggestions(user: &AuthenticatedUser, text: &str) -> ServiceResult<Vec<Suggestion>> {
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(SearchDispatcher::new(text).suggestions())
}

pub fn load_results<R>(
    repo: &R,
    user: &AuthenticatedUser,
    kind: EntityKind,
    text: &str,
    page: usize,
) -> ServiceResult<SearchResultsData>
where
    R: DeviceReader + ShelfReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let mut data = SearchResultsData {
        kind,
        query: text.to_string(),
        url: NavigationRequest::search_results(kind, text).url(),
        devices: None,
        shelves: None,
    };

    match kind {
        EntityKind::Device => {
            let (total, devices) = repo.list_devices(
                DeviceListQuery::new()
                    .search(text)
                    .paginate(page, DEFAULT_ITEMS_PER_PAGE),
            )?;
            data.devices = Some(Paginated::new(devices, page, total, DEFAULT_ITEMS_PER_PAGE));
        }
        EntityKind::Shelf => {
            let (total, shelves) = repo.list_shelves(
                ShelfListQuery::new()
                    .search(text)
                    .paginate(page, DEFAULT_ITEMS_PER_PAGE),
            )?;
            let rows = shelf_rows(repo, shelves)?;
            data.shelves = Some(Paginated::new(rows, page, total, DEFAULT_ITEMS_PER_PAGE));
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;
    use crate::services::fixtures::{loaned_device, user};

    fn admin() -> AuthenticatedUser {
        user(&["loaner", "loaner_admin"])
    }

    #[test]
    fn enter_searches_devices() {
        let form = SearchForm {
            q: "1".into(),
            suggestion: None,
        };

        let (kind, request) = resolve_search(&admin(), &form).unwrap().unwrap();
        assert_eq!(kind, EntityKind::Device);
        assert_eq!(request.path, ["/search/device/".to_string(), "1".to_string()]);
        assert!(request.skip_location_change);
    }

    #[test]
    fn second_suggestion_searches_shelves() {
        let form = SearchForm {
            q: "nyc".into(),
            suggestion: Some(1),
        };

        let (kind, request) = resolve_search(&admin(), &form).unwrap().unwrap();
        assert_eq!(kind, EntityKind::Shelf);
        assert_eq!(request.path, ["/search/shelf/".to_string(), "nyc".to_string()]);
    }

    #[test]
    fn blank_query_does_not_navigate() {
        let form = SearchForm {
            q: "   ".into(),
            suggestion: None,
        };
        assert!(resolve_search(&admin(), &form).unwrap().is_none());
    }

    #[test]
    fn search_requires_admin() {
        let form = SearchForm::default();
        assert!(matches!(
            resolve_search(&user(&["loaner"]), &form),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn suggestions_list_device_first() {
        let entries = suggestions(&admin(), "nyc").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, EntityKind::Device);
        assert_eq!(entries[1].kind, EntityKind::Shelf);
        assert!(suggestions(&admin(), " ").unwrap().is_empty());
    }

    #[test]
    fn device_results_use_parsed_query() {
        let mut repo = MockRepository::new();
        repo.expect_list_devices()
            .withf(|query| {
                query
                    .search
                    .as_ref()
                    .and_then(|s| s.filter("lost"))
                    .and_then(|f| f.as_bool())
                    == Some(true)
            })
            .returning(|_| Ok((1, vec![loaned_device()])));

        let data = load_results(&repo, &admin(), EntityKind::Device, "lost:true", 1).unwrap();

        assert_eq!(data.kind, EntityKind::Device);
        assert_eq!(data.url, "/search/device/lost%3Atrue");
        assert_eq!(data.devices.map(|p| p.items.len()), Some(1));
        assert!(data.shelves.is_none());
    }

    #[test]
    fn shelf_results_link_back_to_one_path_segment() {
        let mut repo = MockRepository::new();
        repo.expect_list_shelves().returning(|_| Ok((0, Vec::new())));

        let data =
            load_results(&repo, &admin(), EntityKind::Shelf, "location:US/NYC", 2).unwrap();

        assert_eq!(data.query, "location:US/NYC");
        assert_eq!(data.url, "/search/shelf/location%3AUS%2FNYC");
        assert_eq!(data.shelves.map(|p| p.items.len()), Some(0));
    }
}
