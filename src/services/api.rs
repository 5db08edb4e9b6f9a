//! Services backing the JSON API.

use serde_json::{Map, Value};

use crate::domain::device::{Device, DeviceInfo};
use crate::domain::loan::DeviceInfoSource;
use crate::domain::query::{SearchRequest, set_search_query_options};
use crate::dto::api::{DeviceSearchResponse, DevicesApiQuery, DevicesResponse};
use crate::models::auth::AuthenticatedUser;
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::{DeviceListQuery, DeviceReader};
use crate::routes::ensure_role;
use crate::services::{ServiceError, ServiceResult};
use crate::services::status::UserDeviceSource;
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE};

/// Device info of the caller's current loan.
pub fn current_device<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<DeviceInfo>
where
    R: DeviceReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    UserDeviceSource::new(repo, user.user_email()?).get_device()
}

/// Returns a page of devices matching the optional search string.
pub fn list_devices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: DevicesApiQuery,
) -> ServiceResult<DevicesResponse>
where
    R: DeviceReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let mut list_query = DeviceListQuery::new();
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        list_query = list_query.search(term);
    }
    if let Some(page) = query.page {
        list_query = list_query.paginate(page, DEFAULT_ITEMS_PER_PAGE);
    }

    let (total, devices) = repo.list_devices(list_query)?;

    Ok(DevicesResponse { total, devices })
}

/// Keeps only `fields` of a serialized device; all of them when `fields` is empty.
fn project(device: &Device, fields: &[String]) -> ServiceResult<Value> {
    let value = serde_json::to_value(device).map_err(|err| {
        log::error!("Failed to serialize device {}: {err}", device.id);
        ServiceError::Internal
    })?;
    if fields.is_empty() {
        return Ok(value);
    }

    let Value::Object(mut object) = value else {
        return Ok(value);
    };
    let projected = fields
        .iter()
        .filter_map(|field| object.remove_entry(field))
        .collect::<Map<_, _>>();
    Ok(Value::Object(projected))
}

/// Structured device search with sort expressions and field selection.
pub fn search_devices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    request: &SearchRequest,
) -> ServiceResult<DeviceSearchResponse>
where
    R: DeviceReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let (query_string, sort_options, returned_fields) = set_search_query_options(request);

    let mut list_query = DeviceListQuery::new().search(&query_string);
    if let Some(sort) = sort_options {
        list_query = list_query.sort(sort);
    }

    let (total, devices) = repo.list_devices(list_query)?;
    let devices = devices
        .iter()
        .map(|device| project(device, &returned_fields))
        .collect::<ServiceResult<Vec<_>>>()?;

    Ok(DeviceSearchResponse { total, devices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;
    use crate::services::fixtures::{loaned_device, user};

    #[test]
    fn current_device_returns_loan() {
        let mut repo = MockRepository::new();
        repo.expect_get_device_for_user()
            .withf(|email| email.as_str() == "borrower@example.com")
            .returning(|_| Ok(Some(loaned_device())));

        let info = current_device(&repo, &user(&["loaner"])).unwrap();
        assert_eq!(info.given_name, "Alex");
        assert!(info.guest_permitted);
    }

    #[test]
    fn current_device_without_loan_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_device_for_user().returning(|_| Ok(None));

        assert!(matches!(
            current_device(&repo, &user(&["loaner"])),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn list_without_page_is_unpaginated() {
        let mut repo = MockRepository::new();
        repo.expect_list_devices()
            .withf(|query| query.pagination.is_none() && query.search.is_none())
            .returning(|_| Ok((1, vec![loaned_device()])));

        let response = list_devices(
            &repo,
            &user(&["loaner_admin"]),
            DevicesApiQuery {
                search: Some("  ".into()),
                page: None,
            },
        )
        .unwrap();

        assert_eq!(response.total, 1);
        assert_eq!(response.devices.len(), 1);
    }

    #[test]
    fn search_applies_sort_and_projects_fields() {
        use crate::domain::query::{SearchExpression, SortDirection};

        let mut repo = MockRepository::new();
        repo.expect_list_devices()
            .withf(|query| {
                let sort = query.sort.as_ref().map(|s| &s.expressions[..]);
                query.search.is_some()
                    && matches!(sort, Some([expr]) if expr.expression == "due_date"
                        && expr.direction == SortDirection::Descending)
            })
            .returning(|_| Ok((1, vec![loaned_device()])));

        let request = SearchRequest {
            query_string: "enrolled:true".into(),
            expressions: vec![SearchExpression {
                expression: "due_date".into(),
                direction: None,
            }],
            returned_fields: vec!["serial_number".into(), "missing".into()],
        };

        let response = search_devices(&repo, &user(&["loaner_admin"]), &request).unwrap();
        assert_eq!(response.total, 1);
        assert_eq!(response.devices[0], serde_json::json!({ "serial_number": "SN-7" }));
    }

    #[test]
    fn search_is_admin_only() {
        let repo = MockRepository::new();
        assert!(matches!(
            search_devices(&repo, &user(&["loaner"]), &SearchRequest::default()),
            Err(ServiceError::Unauthorized)
        ));
    }
}
