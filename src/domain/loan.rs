//! Borrower-facing loan status and extension eligibility.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::device::DeviceInfo;

/// Capability that fetches the current borrower's device info.
pub trait DeviceInfoSource {
    type Error;

    fn get_device(&self) -> Result<DeviceInfo, Self::Error>;
}

/// Observable state of a [`LoanStatusView`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LoanState {
    /// Nothing fetched yet; the page shows a loader.
    Loading,
    /// Loan fields populated from a device-info response.
    Ready,
}

/// Loan status of a single borrowed device.
///
/// Both dates are unset until the first successful [`LoanStatusView::refresh`]
/// and are always replaced together afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoanStatusView {
    pub due_date: Option<NaiveDateTime>,
    pub max_extend_date: Option<NaiveDateTime>,
    pub user_display_name: String,
    pub guest_allowed: bool,
    pub guest_enabled: bool,
}

impl LoanStatusView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoanState {
        match (self.due_date, self.max_extend_date) {
            (Some(_), Some(_)) => LoanState::Ready,
            _ => LoanState::Loading,
        }
    }

    /// Fetches device info once and replaces all loan fields from it.
    ///
    /// On error the view keeps its previous values.
    pub fn refresh<S>(&mut self, source: &S) -> Result<(), S::Error>
    where
        S: DeviceInfoSource + ?Sized,
    {
        let info = source.get_device()?;
        self.apply(info);
        Ok(())
    }

    /// Re-reads the loan after a device-action dialog reported its outcome.
    pub fn on_action_finished<S>(&mut self, source: &S) -> Result<(), S::Error>
    where
        S: DeviceInfoSource + ?Sized,
    {
        self.refresh(source)
    }

    fn apply(&mut self, info: DeviceInfo) {
        *self = Self {
            due_date: Some(info.due_date),
            max_extend_date: Some(info.max_extend_date),
            user_display_name: info.given_name,
            guest_allowed: info.guest_permitted,
            guest_enabled: info.guest_enabled,
        };
    }

    /// True only while the due date is strictly before the max extend date.
    pub fn can_extend(&self) -> bool {
        match (self.due_date, self.max_extend_date) {
            (Some(due), Some(max)) => due < max,
            _ => false,
        }
    }
}

impl From<DeviceInfo> for LoanStatusView {
    fn from(info: DeviceInfo) -> Self {
        let mut view = Self::new();
        view.apply(info);
        view
    }
}
