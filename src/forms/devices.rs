//! Forms for enrolling, assigning and shelving devices.

use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::domain::device::{DeviceLoan, NewDevice};
use crate::domain::types::{AssetTag, DeviceId, GivenName, SerialNumber, ShelfId, UserEmail};
use crate::forms::{FormError, non_blank, parse_form_date};

#[derive(Debug, Deserialize, Validate)]
/// Form data for enrolling a single device.
pub struct EnrollDeviceForm {
    #[validate(length(min = 1, max = 128))]
    pub serial_number: String,
    #[serde(default)]
    pub asset_tag: Option<String>,
    /// Shelf identifier as submitted by the select box; blank means none.
    #[serde(default)]
    pub shelf_id: Option<String>,
}

pub struct EnrollDevicePayload {
    pub device: NewDevice,
}

impl TryFrom<EnrollDeviceForm> for EnrollDevicePayload {
    type Error = FormError;

    fn try_from(form: EnrollDeviceForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let serial_number = SerialNumber::new(form.serial_number.trim())
            .map_err(|_| FormError::InvalidSerialNumber)?;
        let asset_tag = non_blank(form.asset_tag)
            .map(AssetTag::new)
            .transpose()
            .map_err(|_| FormError::InvalidAssetTag)?;
        let shelf_id = non_blank(form.shelf_id)
            .map(|raw| {
                raw.parse::<i32>()
                    .ok()
                    .and_then(|id| ShelfId::new(id).ok())
                    .ok_or(FormError::InvalidShelfId)
            })
            .transpose()?;

        Ok(Self {
            device: NewDevice::new(serial_number, asset_tag, shelf_id),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Form data for loaning a device to a borrower.
pub struct AssignDeviceForm {
    #[validate(email)]
    pub assigned_user: String,
    #[validate(length(min = 1))]
    pub given_name: String,
    pub due_date: String,
    pub max_extend_date: String,
    /// Checkbox; present when ticked.
    #[serde(default)]
    pub guest_permitted: Option<String>,
}

impl TryFrom<AssignDeviceForm> for DeviceLoan {
    type Error = FormError;

    fn try_from(form: AssignDeviceForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let due_date = parse_form_date(&form.due_date)?;
        let max_extend_date = parse_form_date(&form.max_extend_date)?;
        if due_date > max_extend_date {
            return Err(FormError::InvalidDateRange);
        }

        Ok(DeviceLoan {
            assigned_user: UserEmail::new(form.assigned_user)
                .map_err(|_| FormError::InvalidEmail)?,
            given_name: GivenName::new(form.given_name.trim())
                .map_err(|_| FormError::InvalidName)?,
            due_date,
            max_extend_date,
            guest_permitted: form.guest_permitted.is_some(),
        })
    }
}

/// Form placing several devices on one shelf.
///
/// Submitted with repeated `device_ids` keys, so it is decoded with
/// `serde_html_form` rather than the default urlencoded extractor.
#[derive(Debug, Deserialize)]
pub struct ShelveDevicesForm {
    pub shelf_id: i32,
    #[serde(default)]
    pub device_ids: Vec<i32>,
}

pub struct ShelveDevicesPayload {
    pub shelf_id: ShelfId,
    pub device_ids: Vec<DeviceId>,
}

impl TryFrom<&[u8]> for ShelveDevicesPayload {
    type Error = FormError;

    fn try_from(body: &[u8]) -> Result<Self, Self::Error> {
        let form: ShelveDevicesForm = serde_html_form::from_bytes(body).map_err(|err| {
            log::error!("Failed to parse shelve form: {err}");
            FormError::InvalidShelfId
        })?;
        Self::try_from(form)
    }
}

impl TryFrom<ShelveDevicesForm> for ShelveDevicesPayload {
    type Error = FormError;

    fn try_from(form: ShelveDevicesForm) -> Result<Self, Self::Error> {
        let shelf_id = ShelfId::new(form.shelf_id).map_err(|_| FormError::InvalidShelfId)?;

        let mut ids = form.device_ids;
        ids.sort_unstable();
        ids.dedup();
        let device_ids = ids
            .into_iter()
            .map(|id| DeviceId::new(id).map_err(|_| FormError::InvalidDeviceId))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            shelf_id,
            device_ids,
        })
    }
}

#[derive(MultipartForm)]
/// Bulk enrollment upload with `serial_number,asset_tag` rows.
pub struct UploadDevicesForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

#[derive(Debug, Deserialize)]
struct DeviceRecord {
    serial_number: String,
    #[serde(default)]
    asset_tag: Option<String>,
}

impl UploadDevicesForm {
    pub fn parse(&mut self) -> Result<Vec<NewDevice>, FormError> {
        parse_devices_csv(self.csv.file.as_file())
    }
}

/// Reads enrollment rows; duplicated serial numbers keep their first row.
pub fn parse_devices_csv<R: Read>(reader: R) -> Result<Vec<NewDevice>, FormError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut devices: Vec<NewDevice> = Vec::new();
    for (line, record) in rdr.deserialize::<DeviceRecord>().enumerate() {
        let record = record.map_err(|err| FormError::Csv(err.to_string()))?;

        let serial_number = SerialNumber::new(record.serial_number).map_err(|_| {
            FormError::Csv(format!("row {}: missing serial number", line + 1))
        })?;
        if devices.iter().any(|d| d.serial_number == serial_number) {
            continue;
        }
        let asset_tag = non_blank(record.asset_tag)
            .map(AssetTag::new)
            .transpose()
            .map_err(|_| FormError::InvalidAssetTag)?;

        devices.push(NewDevice::new(serial_number, asset_tag, None));
    }

    Ok(devices)
}
