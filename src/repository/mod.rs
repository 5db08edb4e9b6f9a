use crate::{
    db::{DbConnection, DbPool, get_connection},
    domain::{
        device::{Device, DeviceChanges, NewDevice},
        device_event::{DeviceEvent, DeviceEventRecord, DeviceEventType},
        query::{SearchQuery, SortOptions},
        shelf::{NewShelf, Shelf},
        types::{DeviceId, SerialNumber, ShelfId, UserEmail},
    },
    repository::errors::RepositoryResult,
};

pub mod device;
pub mod device_event;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod shelf;

/// Fields accepted in `field:value` device search terms.
pub const DEVICE_SEARCH_FIELDS: &[&str] = &[
    "serial_number",
    "asset_tag",
    "assigned_user",
    "enrolled",
    "damaged",
    "lost",
    "locked",
    "shelf_id",
];

/// Fields accepted in `field:value` shelf search terms.
pub const SHELF_SEARCH_FIELDS: &[&str] = &["location", "capacity", "enabled"];

/// `%text%` with `LIKE` wildcards in `text` escaped by a backslash.
pub(crate) fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub(crate) fn limit_offset(&self) -> (i64, i64) {
        let page = self.page.max(1);
        let per_page = self.per_page as i64;
        (per_page, (page as i64 - 1) * per_page)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeviceListQuery {
    pub search: Option<SearchQuery>,
    pub shelf_id: Option<ShelfId>,
    pub sort: Option<SortOptions>,
    pub pagination: Option<Pagination>,
}

impl DeviceListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `raw` as a device query string.
    pub fn search(mut self, raw: &str) -> Self {
        let query = SearchQuery::parse(raw, DEVICE_SEARCH_FIELDS);
        self.search = Some(query).filter(|q| !q.is_empty());
        self
    }

    pub fn shelf(mut self, shelf_id: ShelfId) -> Self {
        self.shelf_id = Some(shelf_id);
        self
    }

    pub fn sort(mut self, sort: SortOptions) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShelfListQuery {
    pub search: Option<SearchQuery>,
    pub enabled_only: bool,
    pub pagination: Option<Pagination>,
}

impl ShelfListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `raw` as a shelf query string.
    pub fn search(mut self, raw: &str) -> Self {
        let query = SearchQuery::parse(raw, SHELF_SEARCH_FIELDS);
        self.search = Some(query).filter(|q| !q.is_empty());
        self
    }

    pub fn enabled_only(mut self) -> Self {
        self.enabled_only = true;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct DeviceEventListQuery {
    pub device_id: DeviceId,
    pub event_type: Option<DeviceEventType>,
    pub pagination: Option<Pagination>,
}

impl DeviceEventListQuery {
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            event_type: None,
            pagination: None,
        }
    }

    pub fn event_type(mut self, event_type: DeviceEventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

pub trait DeviceReader {
    fn get_device_by_id(&self, id: DeviceId) -> RepositoryResult<Option<Device>>;
    fn get_device_by_serial(&self, serial: &SerialNumber) -> RepositoryResult<Option<Device>>;
    /// Device currently loaned to the borrower, if any.
    fn get_device_for_user(&self, email: &UserEmail) -> RepositoryResult<Option<Device>>;
    fn list_devices(&self, query: DeviceListQuery) -> RepositoryResult<(usize, Vec<Device>)>;
}

/// Device writes; each one stores its [`DeviceEventRecord`] in the same transaction.
pub trait DeviceWriter {
    /// Inserts `new_devices` with one `record` event each, all or nothing.
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
    /// Applies the same `changes` to every device in `ids`, all or nothing.
    fn update_devices(
        &self,
        ids: &[DeviceId],
        changes: &DeviceChanges,
        record: &DeviceEventRecord,
    ) -> RepositoryResult<usize>;
}

pub trait ShelfReader {
    fn get_shelf_by_id(&self, id: ShelfId) -> RepositoryResult<Option<Shelf>>;
    fn list_shelves(&self, query: ShelfListQuery) -> RepositoryResult<(usize, Vec<Shelf>)>;
    fn count_devices_on_shelf(&self, id: ShelfId) -> RepositoryResult<usize>;
}

pub trait ShelfWriter {
    fn create_shelf(&self, new_shelf: &NewShelf) -> RepositoryResult<Shelf>;
    fn set_shelf_enabled(&self, id: ShelfId, enabled: bool) -> RepositoryResult<Shelf>;
}

pub trait DeviceEventReader {
    fn list_device_events(
        &self,
        query: DeviceEventListQuery,
    ) -> RepositoryResult<(usize, Vec<DeviceEvent>)>;
}
