use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{DeviceEventId, DeviceId, UserEmail};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DeviceEvent {
    pub id: DeviceEventId,
    pub device_id: DeviceId,
    pub actor_email: UserEmail,
    pub event_type: DeviceEventType,
    pub event_data: Value,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum DeviceEventType {
    Enrolled,
    Assigned,
    Extended,
    Damaged,
    Lost,
    GuestModeEnabled,
    LoanResumed,
    Unenrolled,
    Shelved,
    Other(String),
}

#[derive(Clone, Debug)]
pub struct NewDeviceEvent {
    pub device_id: DeviceId,
    pub actor_email: UserEmail,
    pub event_type: DeviceEventType,
    pub event_data: Value,
}

impl NewDeviceEvent {
    #[must_use]
    pub fn new(
        device_id: DeviceId,
        actor_email: UserEmail,
        event_type: DeviceEventType,
        event_data: Value,
    ) -> Self {
        Self {
            device_id,
            actor_email,
            event_type,
            event_data,
        }
    }
}

/// Event stored together with a device write; the device id comes from the write.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceEventRecord {
    pub actor_email: UserEmail,
    pub event_type: DeviceEventType,
    pub event_data: Value,
}

impl DeviceEventRecord {
    #[must_use]
    pub fn new(actor_email: UserEmail, event_type: DeviceEventType, event_data: Value) -> Self {
        Self {
            actor_email,
            event_type,
            event_data,
        }
    }

    /// The insertable event for `device_id`.
    pub fn for_device(&self, device_id: DeviceId) -> NewDeviceEvent {
        NewDeviceEvent::new(
            device_id,
            self.actor_email.clone(),
            self.event_type.clone(),
            self.event_data.clone(),
        )
    }
}

impl Display for DeviceEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceEventType::Enrolled => write!(f, "Enrolled"),
            DeviceEventType::Assigned => write!(f, "Assigned"),
            DeviceEventType::Extended => write!(f, "Extended"),
            DeviceEventType::Damaged => write!(f, "Damaged"),
            DeviceEventType::Lost => write!(f, "Lost"),
            DeviceEventType::GuestModeEnabled => write!(f, "GuestModeEnabled"),
            DeviceEventType::LoanResumed => write!(f, "LoanResumed"),
            DeviceEventType::Unenrolled => write!(f, "Unenrolled"),
            DeviceEventType::Shelved => write!(f, "Shelved"),
            DeviceEventType::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for DeviceEventType {
    fn from(s: &str) -> Self {
        match s {
            "Enrolled" => DeviceEventType::Enrolled,
            "Assigned" => DeviceEventType::Assigned,
            "Extended" => DeviceEventType::Extended,
            "Damaged" => DeviceEventType::Damaged,
            "Lost" => DeviceEventType::Lost,
            "GuestModeEnabled" => DeviceEventType::GuestModeEnabled,
            "LoanResumed" => DeviceEventType::LoanResumed,
            "Unenrolled" => DeviceEventType::Unenrolled,
            "Shelved" => DeviceEventType::Shelved,
            _ => DeviceEventType::Other(s.to_string()),
        }
    }
}

impl From<String> for DeviceEventType {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_round_trips_through_text() {
        for event_type in [
            DeviceEventType::Extended,
            DeviceEventType::GuestModeEnabled,
            DeviceEventType::Shelved,
            DeviceEventType::Other("Audit".to_string()),
        ] {
            assert_eq!(DeviceEventType::from(event_type.to_string()), event_type);
        }
    }

    #[test]
    fn record_is_stamped_with_device_id() {
        let record = DeviceEventRecord::new(
            UserEmail::new("admin@example.com").unwrap(),
            DeviceEventType::Shelved,
            serde_json::json!({ "shelf_id": 3 }),
        );

        let event = record.for_device(DeviceId::new(9).unwrap());
        assert_eq!(event.device_id.get(), 9);
        assert_eq!(event.event_type, DeviceEventType::Shelved);
        assert_eq!(event.event_data["shelf_id"], 3);
    }
}
