//! Device aggregate and the loan projection consumed by the status view.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AssetTag, DamagedReason, DeviceId, GivenName, SerialNumber, ShelfId, UserEmail,
};

/// Enrolled device together with its current loan state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    pub serial_number: SerialNumber,
    pub asset_tag: Option<AssetTag>,
    pub enrolled: bool,
    pub assigned_user: Option<UserEmail>,
    pub given_name: Option<GivenName>,
    pub due_date: Option<NaiveDateTime>,
    pub max_extend_date: Option<NaiveDateTime>,
    pub guest_enabled: bool,
    pub guest_permitted: bool,
    pub damaged: bool,
    pub damaged_reason: Option<DamagedReason>,
    pub lost: bool,
    pub locked: bool,
    pub pending_return: bool,
    pub shelf_id: Option<ShelfId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Device {
    /// Whether the device is currently loaned to the given borrower.
    pub fn is_assigned_to(&self, email: &UserEmail) -> bool {
        self.assigned_user.as_ref() == Some(email)
    }

    /// Projects the loan fields shown on the borrower's status page.
    ///
    /// Returns `None` when the device is not on loan.
    pub fn loan_info(&self) -> Option<DeviceInfo> {
        Some(DeviceInfo {
            due_date: self.due_date?,
            max_extend_date: self.max_extend_date?,
            given_name: self
                .given_name
                .as_ref()
                .map(|name| name.as_str().to_string())
                .unwrap_or_default(),
            guest_enabled: self.guest_enabled,
            guest_permitted: self.guest_permitted,
        })
    }
}

/// Device-info response used to refresh a loan status view.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceInfo {
    pub due_date: NaiveDateTime,
    pub max_extend_date: NaiveDateTime,
    pub given_name: String,
    pub guest_enabled: bool,
    pub guest_permitted: bool,
}

/// Payload for enrolling a new device.
#[derive(Clone, Debug)]
pub struct NewDevice {
    pub serial_number: SerialNumber,
    pub asset_tag: Option<AssetTag>,
    pub shelf_id: Option<ShelfId>,
}

impl NewDevice {
    #[must_use]
    pub fn new(
        serial_number: SerialNumber,
        asset_tag: Option<AssetTag>,
        shelf_id: Option<ShelfId>,
    ) -> Self {
        Self {
            serial_number,
            asset_tag,
            shelf_id,
        }
    }
}

/// Field changes applied to a device by a loan action.
///
/// `None` leaves a column untouched; `Some(None)` clears a nullable column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviceChanges {
    pub enrolled: Option<bool>,
    pub assigned_user: Option<Option<UserEmail>>,
    pub given_name: Option<Option<GivenName>>,
    pub due_date: Option<Option<NaiveDateTime>>,
    pub max_extend_date: Option<Option<NaiveDateTime>>,
    pub guest_enabled: Option<bool>,
    pub guest_permitted: Option<bool>,
    pub damaged: Option<bool>,
    pub damaged_reason: Option<Option<DamagedReason>>,
    pub lost: Option<bool>,
    pub locked: Option<bool>,
    pub pending_return: Option<bool>,
    pub shelf_id: Option<Option<ShelfId>>,
}

/// Assignment of a device to a borrower.
#[derive(Clone, Debug)]
pub struct DeviceLoan {
    pub assigned_user: UserEmail,
    pub given_name: GivenName,
    pub due_date: NaiveDateTime,
    pub max_extend_date: NaiveDateTime,
    pub guest_permitted: bool,
}

impl From<DeviceLoan> for DeviceChanges {
    fn from(loan: DeviceLoan) -> Self {
        Self {
            assigned_user: Some(Some(loan.assigned_user)),
            given_name: Some(Some(loan.given_name)),
            due_date: Some(Some(loan.due_date)),
            max_extend_date: Some(Some(loan.max_extend_date)),
            guest_enabled: Some(false),
            guest_permitted: Some(loan.guest_permitted),
            pending_return: Some(false),
            shelf_id: Some(None),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sample_device() -> Device {
        let now = NaiveDate::from_ymd_opt(2017, 3, 20)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Device {
            id: DeviceId::new(1).unwrap(),
            serial_number: SerialNumber::new("SN-1").unwrap(),
            asset_tag: None,
            enrolled: true,
            assigned_user: Some(UserEmail::new("john@example.com").unwrap()),
            given_name: Some(GivenName::new("John").unwrap()),
            due_date: Some(now),
            max_extend_date: Some(now + chrono::Duration::weeks(1)),
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
    fn loan_info_copies_loan_fields() {
        let device = sample_device();
        let info = device.loan_info().unwrap();
        assert_eq!(Some(info.due_date), device.due_date);
        assert_eq!(Some(info.max_extend_date), device.max_extend_date);
        assert_eq!(info.given_name, "John");
        assert!(info.guest_permitted);
        assert!(!info.guest_enabled);
    }

    #[test]
    fn loan_info_requires_both_dates() {
        let mut device = sample_device();
        device.max_extend_date = None;
        assert!(device.loan_info().is_none());
    }

    #[test]
    fn assignment_check_compares_emails() {
        let device = sample_device();
        assert!(device.is_assigned_to(&UserEmail::new("JOHN@example.com").unwrap()));
        assert!(!device.is_assigned_to(&UserEmail::new("jane@example.com").unwrap()));
    }
}
