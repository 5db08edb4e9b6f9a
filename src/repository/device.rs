//! Repository implementation for enrolled devices.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::{
    domain::{
        device::{Device, DeviceChanges, NewDevice},
        device_event::DeviceEventRecord,
        query::{SortDirection, SortOptions},
        types::{DeviceId, SerialNumber, UserEmail},
    },
    models::device::{Device as DbDevice, DeviceChangeset, NewDevice as DbNewDevice},
    models::device_event::NewDeviceEvent as DbNewDeviceEvent,
    repository::errors::{RepositoryError, RepositoryResult},
    repository::{DeviceListQuery, DeviceReader, DeviceWriter, DieselRepository, contains_pattern},
    schema::{device_events, devices},
};

/// Builds the filtered (unsorted, unpaginated) device query.
fn filtered_devices(query: &DeviceListQuery) -> devices::BoxedQuery<'static, Sqlite> {
    let mut items = devices::table.into_boxed();

    if let Some(shelf_id) = query.shelf_id {
        items = items.filter(devices::shelf_id.eq(shelf_id.get()));
    }

    let Some(search) = &query.search else {
        return items;
    };

    for filter in &search.filters {
        let value = filter.value.clone();
        items = match (filter.field.as_str(), filter.as_bool()) {
            ("serial_number", _) => items.filter(devices::serial_number.eq(value)),
            ("asset_tag", _) => items.filter(devices::asset_tag.eq(value)),
            ("assigned_user", _) => items.filter(devices::assigned_user.eq(value.to_lowercase())),
            ("enrolled", Some(flag)) => items.filter(devices::enrolled.eq(flag)),
            ("damaged", Some(flag)) => items.filter(devices::damaged.eq(flag)),
            ("lost", Some(flag)) => items.filter(devices::lost.eq(flag)),
            ("locked", Some(flag)) => items.filter(devices::locked.eq(flag)),
            ("shelf_id", _) => match filter.as_i32() {
                Some(shelf_id) => items.filter(devices::shelf_id.eq(shelf_id)),
                None => items,
            },
            _ => {
                log::warn!("Ignoring device filter {}:{}", filter.field, filter.value);
                items
            }
        };
    }

    if let Some(text) = &search.text {
        let pattern = contains_pattern(text);
        items = items.filter(
            devices::serial_number
                .like(pattern.clone())
                .escape('\\')
                .or(devices::asset_tag.like(pattern.clone()).escape('\\'))
                .or(devices::assigned_user.like(pattern).escape('\\')),
        );
    }

    items
}

fn sorted_devices(
    mut items: devices::BoxedQuery<'static, Sqlite>,
    sort: Option<&SortOptions>,
) -> devices::BoxedQuery<'static, Sqlite> {
    for expr in sort.map(|s| s.expressions.as_slice()).unwrap_or_default() {
        let ascending = expr.direction == SortDirection::Ascending;
        items = match (expr.expression.as_str(), ascending) {
            ("serial_number", true) => items.then_order_by(devices::serial_number.asc()),
            ("serial_number", false) => items.then_order_by(devices::serial_number.desc()),
            ("due_date", true) => items.then_order_by(devices::due_date.asc()),
            ("due_date", false) => items.then_order_by(devices::due_date.desc()),
            ("enrolled", true) => items.then_order_by(devices::enrolled.asc()),
            ("enrolled", false) => items.then_order_by(devices::enrolled.desc()),
            ("created_at", true) => items.then_order_by(devices::created_at.asc()),
            ("created_at", false) => items.then_order_by(devices::created_at.desc()),
            _ => items,
        };
    }
    items.then_order_by(devices::id.asc())
}

fn into_domain(device: DbDevice) -> RepositoryResult<Device> {
    Device::try_from(device).map_err(RepositoryError::from)
}

impl DeviceReader for DieselRepository {
    fn get_device_by_id(&self, id: DeviceId) -> RepositoryResult<Option<Device>> {
        let mut conn = self.conn()?;
        devices::table
            .find(id.get())
            .first::<DbDevice>(&mut conn)
            .optional()?
            .map(into_domain)
            .transpose()
    }

    fn get_device_by_serial(&self, serial: &SerialNumber) -> RepositoryResult<Option<Device>> {
        let mut conn = self.conn()?;
        devices::table
            .filter(devices::serial_number.eq(serial.as_str()))
            .first::<DbDevice>(&mut conn)
            .optional()?
            .map(into_domain)
            .transpose()
    }

    fn get_device_for_user(&self, email: &UserEmail) -> RepositoryResult<Option<Device>> {
        let mut conn = self.conn()?;
        devices::table
            .filter(devices::assigned_user.eq(email.as_str()))
            .filter(devices::enrolled.eq(true))
            .order(devices::updated_at.desc())
            .first::<DbDevice>(&mut conn)
            .optional()?
            .map(into_domain)
            .transpose()
    }

    fn list_devices(&self, query: DeviceListQuery) -> RepositoryResult<(usize, Vec<Device>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_devices(&query).count().get_result(&mut conn)?;

        let mut items = sorted_devices(filtered_devices(&query), query.sort.as_ref());
        if let Some(pagination) = &query.pagination {
            let (limit, offset) = pagination.limit_offset();
            items = items.limit(limit).offset(offset);
        }

        let devices = items
            .load::<DbDevice>(&mut conn)?
            .into_iter()
            .map(into_domain)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, devices))
    }
}

/// Records `record` against `device_id`; runs inside the caller's transaction.
fn insert_event(
    conn: &mut SqliteConnection,
    device_id: DeviceId,
    record: &DeviceEventRecord,
) -> RepositoryResult<()> {
    let event = record.for_device(device_id);
    diesel::insert_into(device_events::table)
        .values(&DbNewDeviceEvent::from(&event))
        .execute(conn)?;
    Ok(())
}

/// Updates one device and records its event; runs inside the caller's transaction.
fn update_with_event(
    conn: &mut SqliteConnection,
    id: DeviceId,
    changeset: &DeviceChangeset,
    record: &DeviceEventRecord,
) -> RepositoryResult<Device> {
    let updated = diesel::update(devices::table.find(id.get()))
        .set(changeset)
        .get_result::<DbDevice>(conn)?;
    insert_event(conn, id, record)?;
    into_domain(updated)
}

impl DeviceWriter for DieselRepository {
    fn create_devices(
        &self,
        new_devices: &[NewDevice],
        record: &DeviceEventRecord,
    ) -> RepositoryResult<Vec<Device>> {
        let mut conn = self.conn()?;
        let insertables: Vec<DbNewDevice> = new_devices.iter().map(Into::into).collect();

        conn.transaction::<Vec<Device>, RepositoryError, _>(|conn| {
            let mut created = Vec::with_capacity(insertables.len());
            for insertable in &insertables {
                let device = into_domain(
                    diesel::insert_into(devices::table)
                        .values(insertable)
                        .get_result::<DbDevice>(conn)?,
                )?;
                insert_event(conn, device.id, record)?;
                created.push(device);
            }
            Ok(created)
        })
    }

    fn update_device(
        &self,
        id: DeviceId,
        changes: &DeviceChanges,
        record: &DeviceEventRecord,
    ) -> RepositoryResult<Device> {
        let mut conn = self.conn()?;
        let changeset = DeviceChangeset::new(changes, Utc::now().naive_utc());
        conn.transaction::<Device, RepositoryError, _>(|conn| {
            update_with_event(conn, id, &changeset, record)
        })
    }

    fn update_devices(
        &self,
        ids: &[DeviceId],
        changes: &DeviceChanges,
        record: &DeviceEventRecord,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let changeset = DeviceChangeset::new(changes, Utc::now().naive_utc());
        conn.transaction::<usize, RepositoryError, _>(|conn| {
            for id in ids {
                update_with_event(conn, *id, &changeset, record)?;
            }
            Ok(ids.len())
        })
    }
}
