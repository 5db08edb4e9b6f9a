//! Services behind the device administration pages.

use serde_json::json;

use crate::SERVICE_ADMIN_ROLE;
use crate::domain::device::{Device, DeviceChanges, DeviceLoan, NewDevice};
use crate::domain::device_event::{DeviceEventRecord, DeviceEventType};
use crate::domain::shelf::Shelf;
use crate::domain::types::{DeviceId, ShelfId};
use crate::dto::devices::{DevicePageData, DevicesPageData, DevicesQuery};
use crate::forms::devices::{
    AssignDeviceForm, EnrollDeviceForm, EnrollDevicePayload, ShelveDevicesPayload,
    UploadDevicesForm,
};
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    DeviceEventListQuery, DeviceEventReader, DeviceListQuery, DeviceReader, DeviceWriter,
    ShelfListQuery, ShelfReader,
};
use crate::routes::ensure_role;
use crate::services::{ServiceError, ServiceResult};

fn enabled_shelves<R>(repo: &R) -> ServiceResult<Vec<Shelf>>
where
    R: ShelfReader + ?Sized,
{
    let (_, shelves) = repo.list_shelves(ShelfListQuery::new().enabled_only())?;
    Ok(shelves)
}

/// Loads a shelf that can accept `incoming` more devices.
fn shelf_with_room<R>(repo: &R, shelf_id: ShelfId, incoming: usize) -> ServiceResult<Shelf>
where
    R: ShelfReader + ?Sized,
{
    let shelf = repo
        .get_shelf_by_id(shelf_id)?
        .ok_or(ServiceError::NotFound)?;

    if !shelf.enabled {
        return Err(ServiceError::Form(format!(
            "Shelf {} is disabled.",
            shelf.display_name()
        )));
    }

    let occupied = repo.count_devices_on_shelf(shelf.id)?;
    if occupied + incoming > shelf.capacity.get() as usize {
        return Err(ServiceError::Form(format!(
            "Shelf {} has room for {} more device(s).",
            shelf.display_name(),
            (shelf.capacity.get() as usize).saturating_sub(occupied)
        )));
    }

    Ok(shelf)
}

/// Loads the paginated device list for the devices page.
pub fn list_devices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: DevicesQuery,
) -> ServiceResult<DevicesPageData>
where
    R: DeviceReader + ShelfReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let page = query.page.unwrap_or(1);
    let search_query = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let mut list_query = DeviceListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = &search_query {
        list_query = list_query.search(term);
    }

    let (total, devices) = repo.list_devices(list_query)?;

    Ok(DevicesPageData {
        devices: Paginated::new(devices, page, total, DEFAULT_ITEMS_PER_PAGE),
        search_query,
        shelves: enabled_shelves(repo)?,
    })
}

/// Loads a device with its shelf and action history.
pub fn load_device<R>(
    repo: &R,
    user: &AuthenticatedUser,
    device_id: i32,
    page: usize,
) -> ServiceResult<DevicePageData>
where
    R: DeviceReader + ShelfReader + DeviceEventReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let device = repo
        .get_device_by_id(DeviceId::new(device_id)?)?
        .ok_or(ServiceError::NotFound)?;

    let shelf = match device.shelf_id {
        Some(shelf_id) => repo.get_shelf_by_id(shelf_id)?,
        None => None,
    };

    let (total, events) = repo.list_device_events(
        DeviceEventListQuery::new(device.id).paginate(page, DEFAULT_ITEMS_PER_PAGE),
    )?;

    Ok(DevicePageData {
        device,
        shelf,
        events: Paginated::new(events, page, total, DEFAULT_ITEMS_PER_PAGE),
        shelves: enabled_shelves(repo)?,
    })
}

/// Enrolls a single device, optionally placing it on a shelf.
pub fn enroll_device<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: EnrollDeviceForm,
) -> ServiceResult<Device>
where
    R: DeviceReader + DeviceWriter + ShelfReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;
    let actor = user.user_email()?;

    let EnrollDevicePayload { device: new_device } = EnrollDevicePayload::try_from(form)?;

    if repo.get_device_by_serial(&new_device.serial_number)?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "device {} is already enrolled",
            new_device.serial_number
        )));
    }
    if let Some(shelf_id) = new_device.shelf_id {
        shelf_with_room(repo, shelf_id, 1)?;
    }

    let record = DeviceEventRecord::new(
        actor,
        DeviceEventType::Enrolled,
        json!({ "shelf_id": new_device.shelf_id }),
    );
    repo.create_devices(std::slice::from_ref(&new_device), &record)?
        .pop()
        .ok_or(ServiceError::Internal)
}

/// Enrolls every device listed in an uploaded CSV file.
pub fn upload_devices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &mut UploadDevicesForm,
) -> ServiceResult<usize>
where
    R: DeviceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;
    let actor = user.user_email()?;

    let devices: Vec<NewDevice> = form.parse().map_err(|err| {
        log::error!("Failed to parse devices: {err}");
        ServiceError::from(err)
    })?;

    let record = DeviceEventRecord::new(
        actor,
        DeviceEventType::Enrolled,
        json!({ "source": "csv" }),
    );
    let created = repo.create_devices(&devices, &record).map_err(|err| {
        log::error!("Failed to enroll devices: {err}");
        ServiceError::from(err)
    })?;

    Ok(created.len())
}

/// Loans an enrolled device to a borrower.
pub fn assign_device<R>(
    repo: &R,
    user: &AuthenticatedUser,
    device_id: i32,
    form: AssignDeviceForm,
) -> ServiceResult<Device>
where
    R: DeviceReader + DeviceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;
    let actor = user.user_email()?;

    let loan = DeviceLoan::try_from(form)?;

    let device = repo
        .get_device_by_id(DeviceId::new(device_id)?)?
        .ok_or(ServiceError::NotFound)?;

    if !device.enrolled {
        return Err(ServiceError::Form("Device is not enrolled.".to_string()));
    }
    if device.lost || device.locked {
        return Err(ServiceError::Form(
            "Lost or locked devices cannot be loaned.".to_string(),
        ));
    }

    let event_data = json!({
        "assigned_user": loan.assigned_user.as_str(),
        "due_date": loan.due_date,
        "max_extend_date": loan.max_extend_date,
    });
    let record = DeviceEventRecord::new(actor, DeviceEventType::Assigned, event_data);
    Ok(repo.update_device(device.id, &DeviceChanges::from(loan), &record)?)
}

/// Places the selected devices on a shelf, respecting its capacity.
pub fn shelve_devices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &[u8],
) -> ServiceResult<usize>
where
    R: DeviceReader + DeviceWriter + ShelfReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;
    let actor = user.user_email()?;

    let payload = ShelveDevicesPayload::try_from(form)?;

    let mut devices = Vec::with_capacity(payload.device_ids.len());
    for device_id in &payload.device_ids {
        let device = repo
            .get_device_by_id(*device_id)?
            .ok_or_else(|| ServiceError::Form("Invalid device list.".to_string()))?;
        if device.assigned_user.is_some() {
            return Err(ServiceError::Form(format!(
                "Device {} is on loan.",
                device.serial_number
            )));
        }
        devices.push(device);
    }

    let incoming = devices
        .iter()
        .filter(|d| d.shelf_id != Some(payload.shelf_id))
        .count();
    let shelf = shelf_with_room(repo, payload.shelf_id, incoming)?;

    let changes = DeviceChanges {
        shelf_id: Some(Some(shelf.id)),
        ..DeviceChanges::default()
    };
    let record = DeviceEventRecord::new(
        actor,
        DeviceEventType::Shelved,
        json!({ "shelf_id": shelf.id }),
    );
    Ok(repo.update_devices(&payload.device_ids, &changes, &record)?)
}
