//! Borrower status page and the repository-backed device-info source.

use crate::domain::device::{Device, DeviceInfo};
use crate::domain::loan::{DeviceInfoSource, LoanStatusView};
use crate::domain::types::{DeviceId, UserEmail};
use crate::dto::status::StatusPageData;
use crate::models::auth::AuthenticatedUser;
use crate::repository::DeviceReader;
use crate::routes::{check_role, ensure_role};
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE};

/// Device-info source reading the loan of one borrower.
pub struct UserDeviceSource<'a, R: ?Sized> {
    repo: &'a R,
    email: UserEmail,
}

impl<'a, R> UserDeviceSource<'a, R>
where
    R: DeviceReader + ?Sized,
{
    pub fn new(repo: &'a R, email: UserEmail) -> Self {
        Self { repo, email }
    }

    fn loaned_device(&self) -> ServiceResult<Device> {
        self.repo
            .get_device_for_user(&self.email)?
            .ok_or(ServiceError::NotFound)
    }
}

impl<R> DeviceInfoSource for UserDeviceSource<'_, R>
where
    R: DeviceReader + ?Sized,
{
    type Error = ServiceError;

    fn get_device(&self) -> ServiceResult<DeviceInfo> {
        self.loaned_device()?
            .loan_info()
            .ok_or(ServiceError::NotFound)
    }
}

/// Device-info source reading a device by id, whoever holds it.
pub struct StoredDeviceSource<'a, R: ?Sized> {
    repo: &'a R,
    device_id: DeviceId,
}

impl<'a, R> StoredDeviceSource<'a, R>
where
    R: DeviceReader + ?Sized,
{
    pub fn new(repo: &'a R, device_id: DeviceId) -> Self {
        Self { repo, device_id }
    }
}

impl<R> DeviceInfoSource for StoredDeviceSource<'_, R>
where
    R: DeviceReader + ?Sized,
{
    type Error = ServiceError;

    fn get_device(&self) -> ServiceResult<DeviceInfo> {
        self.repo
            .get_device_by_id(self.device_id)?
            .and_then(|device| device.loan_info())
            .ok_or(ServiceError::NotFound)
    }
}

/// Action dialogs a user may open for `device`.
pub fn available_actions(
    device: &Device,
    view: &LoanStatusView,
    is_admin: bool,
) -> Vec<&'static str> {
    let mut actions = Vec::new();
    if view.can_extend() {
        actions.push("extend");
    }
    if device.guest_permitted && !device.guest_enabled {
        actions.push("guest");
    }
    if device.pending_return {
        actions.push("resume");
    }
    if !device.damaged {
        actions.push("damaged");
    }
    if !device.lost {
        actions.push("lost");
    }
    if is_admin {
        actions.push("unenroll");
    }
    actions
}

/// Loads the current user's loan for the status page.
///
/// A user without a loaned device gets the loading page back; other
/// failures are returned and leave the view untouched.
pub fn load_status<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<StatusPageData>
where
    R: DeviceReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let source = UserDeviceSource::new(repo, user.user_email()?);

    let mut view = LoanStatusView::new();
    match view.refresh(&source) {
        Ok(()) => {}
        Err(ServiceError::NotFound) => return Ok(StatusPageData::loading()),
        Err(err) => {
            log::error!("Failed to refresh loan status: {err}");
            return Err(err);
        }
    }

    // The loan was just read; a concurrent return between the two reads shows the loader.
    let Ok(device) = source.loaned_device() else {
        return Ok(StatusPageData::loading());
    };
    let actions = available_actions(&device, &view, check_role(SERVICE_ADMIN_ROLE, &user.roles));

    Ok(StatusPageData::from_view(view, Some(device.id), actions))
}
