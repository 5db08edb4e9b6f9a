//! Diesel models for enrolled devices.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::device::{
    Device as DomainDevice, DeviceChanges as DomainDeviceChanges, NewDevice as DomainNewDevice,
};
use crate::domain::types::{
    AssetTag, DamagedReason, DeviceId, GivenName, SerialNumber, ShelfId, TypeConstraintError,
    UserEmail,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::devices)]
/// Diesel model for [`crate::domain::device::Device`].
pub struct Device {
    pub id: i32,
    pub serial_number: String,
    pub asset_tag: Option<String>,
    pub enrolled: bool,
    pub assigned_user: Option<String>,
    pub given_name: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub max_extend_date: Option<NaiveDateTime>,
    pub guest_enabled: bool,
    pub guest_permitted: bool,
    pub damaged: bool,
    pub damaged_reason: Option<String>,
    pub lost: bool,
    pub locked: bool,
    pub pending_return: bool,
    pub shelf_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::devices)]
/// Insertable form of [`Device`].
pub struct NewDevice<'a> {
    pub serial_number: &'a str,
    pub asset_tag: Option<&'a str>,
    pub shelf_id: Option<i32>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::devices)]
/// Column updates applied by loan actions; `None` leaves a column untouched.
pub struct DeviceChangeset<'a> {
    pub enrolled: Option<bool>,
    pub assigned_user: Option<Option<&'a str>>,
    pub given_name: Option<Option<&'a str>>,
    pub due_date: Option<Option<NaiveDateTime>>,
    pub max_extend_date: Option<Option<NaiveDateTime>>,
    pub guest_enabled: Option<bool>,
    pub guest_permitted: Option<bool>,
    pub damaged: Option<bool>,
    pub damaged_reason: Option<Option<&'a str>>,
    pub lost: Option<bool>,
    pub locked: Option<bool>,
    pub pending_return: Option<bool>,
    pub shelf_id: Option<Option<i32>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Device> for DomainDevice {
    type Error = TypeConstraintError;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DeviceId::new(device.id)?,
            serial_number: SerialNumber::new(device.serial_number)?,
            asset_tag: device.asset_tag.map(AssetTag::new).transpose()?,
            enrolled: device.enrolled,
            assigned_user: device.assigned_user.map(UserEmail::new).transpose()?,
            given_name: device.given_name.map(GivenName::new).transpose()?,
            due_date: device.due_date,
            max_extend_date: device.max_extend_date,
            guest_enabled: device.guest_enabled,
            guest_permitted: device.guest_permitted,
            damaged: device.damaged,
            damaged_reason: device.damaged_reason.map(DamagedReason::new).transpose()?,
            lost: device.lost,
            locked: device.locked,
            pending_return: device.pending_return,
            shelf_id: device.shelf_id.map(ShelfId::new).transpose()?,
            created_at: device.created_at,
            updated_at: device.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewDevice> for NewDevice<'a> {
    fn from(device: &'a DomainNewDevice) -> Self {
        Self {
            serial_number: device.serial_number.as_str(),
            asset_tag: device.asset_tag.as_ref().map(AssetTag::as_str),
            shelf_id: device.shelf_id.map(ShelfId::get),
        }
    }
}

impl<'a> DeviceChangeset<'a> {
    pub fn new(changes: &'a DomainDeviceChanges, updated_at: NaiveDateTime) -> Self {
        Self {
            enrolled: changes.enrolled,
            assigned_user: changes
                .assigned_user
                .as_ref()
                .map(|user| user.as_ref().map(UserEmail::as_str)),
            given_name: changes
                .given_name
                .as_ref()
                .map(|name| name.as_ref().map(GivenName::as_str)),
            due_date: changes.due_date,
            max_extend_date: changes.max_extend_date,
            guest_enabled: changes.guest_enabled,
            guest_permitted: changes.guest_permitted,
            damaged: changes.damaged,
            damaged_reason: changes
                .damaged_reason
                .as_ref()
                .map(|reason| reason.as_ref().map(DamagedReason::as_str)),
            lost: changes.lost,
            locked: changes.locked,
            pending_return: changes.pending_return,
            shelf_id: changes.shelf_id.map(|shelf| shelf.map(ShelfId::get)),
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn db_device() -> Device {
        let now = Utc::now().naive_utc();
        Device {
            id: 3,
            serial_number: "SN-3".to_string(),
            asset_tag: Some("TAG".to_string()),
            enrolled: true,
            assigned_user: Some("john@example.com".to_string()),
            given_name: Some("John".to_string()),
            due_date: Some(now),
            max_extend_date: Some(now),
            guest_enabled: false,
            guest_permitted: true,
            damaged: false,
            damaged_reason: None,
            lost: false,
            locked: false,
            pending_return: false,
            shelf_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn device_into_domain() {
        let domain = DomainDevice::try_from(db_device()).unwrap();
        assert_eq!(domain.id.get(), 3);
        assert_eq!(domain.serial_number.as_str(), "SN-3");
        assert_eq!(domain.asset_tag.unwrap().as_str(), "TAG");
        assert_eq!(domain.given_name.unwrap().as_str(), "John");
        assert!(domain.guest_permitted);
    }

    #[test]
    fn invalid_row_is_rejected() {
        let mut device = db_device();
        device.assigned_user = Some("not-an-email".to_string());
        assert_eq!(
            DomainDevice::try_from(device),
            Err(TypeConstraintError::InvalidEmail)
        );
    }

    #[test]
    fn changeset_maps_clears_and_skips() {
        let changes = DomainDeviceChanges {
            assigned_user: Some(None),
            lost: Some(true),
            ..DomainDeviceChanges::default()
        };
        let now = Utc::now().naive_utc();
        let changeset = DeviceChangeset::new(&changes, now);
        assert_eq!(changeset.assigned_user, Some(None));
        assert_eq!(changeset.lost, Some(true));
        assert_eq!(changeset.due_date, None);
        assert_eq!(changeset.updated_at, now);
    }
}
