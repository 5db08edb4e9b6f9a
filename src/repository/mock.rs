//! Mock repository used to exercise services without a database.

use mockall::mock;

use crate::domain::device::{Device, DeviceChanges, NewDevice};
use crate::domain::device_event::{DeviceEvent, DeviceEventRecord};
use crate::domain::shelf::{NewShelf, Shelf};
use crate::domain::types::{DeviceId, SerialNumber, ShelfId, UserEmail};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    DeviceEventListQuery, DeviceEventReader, DeviceListQuery, DeviceReader, DeviceWriter,
    ShelfListQuery, ShelfReader, ShelfWriter,
};

mock! {
    pub Repository {}

    impl DeviceReader for Repository {
        fn get_device_by_id(&self, id: DeviceId) -> RepositoryResult<Option<Device>>;
        fn get_device_by_serial(&self, serial: &SerialNumber) -> RepositoryResult<Option<Device>>;
        fn get_device_for_user(&self, email: &UserEmail) -> RepositoryResult<Option<Device>>;
        fn list_devices(&self, query: DeviceListQuery) -> RepositoryResult<(usize, Vec<Device>)>;
    }

    impl DeviceWriter for Repository {
        fn create_devices(
            &self,
            new_devices: &[NewDevice],
            record: &DeviceEventRecord,
        ) -> RepositoryResult<Vec<Device>>;
        fn update_device(
            &self,
            id: DeviceId,
            changes: &DeviceChanges,
            record: &DeviceEventRecord,
        ) -> RepositoryResult<Device>;
        fn update_devices(
            &self,
            ids: &[DeviceId],
            changes: &DeviceChanges,
            record: &DeviceEventRecord,
        ) -> RepositoryResult<usize>;
    }

    impl ShelfReader for Repository {
        fn get_shelf_by_id(&self, id: ShelfId) -> RepositoryResult<Option<Shelf>>;
        fn list_shelves(&self, query: ShelfListQuery) -> RepositoryResult<(usize, Vec<Shelf>)>;
        fn count_devices_on_shelf(&self, id: ShelfId) -> RepositoryResult<usize>;
    }

    impl ShelfWriter for Repository {
        fn create_shelf(&self, new_shelf: &NewShelf) -> RepositoryResult<Shelf>;
        fn set_shelf_enabled(&self, id: ShelfId, enabled: bool) -> RepositoryResult<Shelf>;
    }

    impl DeviceEventReader for Repository {
        fn list_device_events(
            &self,
            query: DeviceEventListQuery,
        ) -> RepositoryResult<(usize, Vec<DeviceEvent>)>;
    }
}
