use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::{
    domain::device_event::DeviceEvent,
    models::device_event::DeviceEvent as DbDeviceEvent,
    repository::errors::{RepositoryError, RepositoryResult},
    repository::{DeviceEventListQuery, DeviceEventReader, DieselRepository},
    schema::device_events,
};

fn filtered_events(query: &DeviceEventListQuery) -> device_events::BoxedQuery<'static, Sqlite> {
    let mut items = device_events::table
        .filter(device_events::device_id.eq(query.device_id.get()))
        .into_boxed();
    if let Some(event_type) = &query.event_type {
        items = items.filter(device_events::event_type.eq(event_type.to_string()));
    }
    items
}

impl DeviceEventReader for DieselRepository {
    fn list_device_events(
        &self,
        query: DeviceEventListQuery,
    ) -> RepositoryResult<(usize, Vec<DeviceEvent>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_events(&query).count().get_result(&mut conn)?;

        let mut items = filtered_events(&query).order((
            device_events::created_at.desc(),
            device_events::id.desc(),
        ));
        if let Some(pagination) = &query.pagination {
            let (limit, offset) = pagination.limit_offset();
            items = items.limit(limit).offset(offset);
        }

        let events = items
            .load::<DbDeviceEvent>(&mut conn)?
            .into_iter()
            .map(|event| DeviceEvent::try_from(event).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, events))
    }
}
