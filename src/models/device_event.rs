//! Diesel models for storing device action history.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::device_event::{
    DeviceEvent as DomainDeviceEvent, NewDeviceEvent as DomainNewDeviceEvent,
};
use crate::domain::types::{DeviceEventId, DeviceId, TypeConstraintError, UserEmail};
use crate::models::device::Device;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Device, foreign_key = device_id))]
#[diesel(table_name = crate::schema::device_events)]
pub struct DeviceEvent {
    pub id: i32,
    pub device_id: i32,
    pub actor_email: String,
    pub event_type: String,
    pub event_data: String, // JSON text
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::device_events)]
pub struct NewDeviceEvent<'a> {
    pub device_id: i32,
    pub actor_email: &'a str,
    pub event_type: String,
    pub event_data: String,
}

impl TryFrom<DeviceEvent> for DomainDeviceEvent {
    type Error = TypeConstraintError;

    fn try_from(event: DeviceEvent) -> Result<Self, Self::Error> {
        let event_data = serde_json::from_str(&event.event_data).unwrap_or_default();

        Ok(Self {
            id: DeviceEventId::new(event.id)?,
            device_id: DeviceId::new(event.device_id)?,
            actor_email: UserEmail::new(event.actor_email)?,
            event_type: event.event_type.into(),
            event_data,
            created_at: event.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewDeviceEvent> for NewDeviceEvent<'a> {
    fn from(event: &'a DomainNewDeviceEvent) -> Self {
        Self {
            device_id: event.device_id.get(),
            actor_email: event.actor_email.as_str(),
            event_type: event.event_type.to_string(),
            event_data: event.event_data.to_string(),
        }
    }
}
