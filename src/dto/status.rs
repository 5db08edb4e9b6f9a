//! Data rendered on the borrower status page.

use serde::Serialize;

use crate::domain::loan::{LoanState, LoanStatusView};
use crate::domain::types::DeviceId;

/// Loan status plus the device actions the borrower may open.
#[derive(Debug, Serialize)]
pub struct StatusPageData {
    pub status: LoanStatusView,
    pub state: LoanState,
    pub can_extend: bool,
    pub device_id: Option<DeviceId>,
    /// Names of the action dialogs offered for the device.
    pub actions: Vec<&'static str>,
}

impl StatusPageData {
    /// Page shown while the loan has not been loaded.
    pub fn loading() -> Self {
        Self::from_view(LoanStatusView::new(), None, Vec::new())
    }

    pub fn from_view(
        status: LoanStatusView,
        device_id: Option<DeviceId>,
        actions: Vec<&'static str>,
    ) -> Self {
        Self {
            state: status.state(),
            can_extend: status.can_extend(),
            status,
            device_id,
            actions,
        }
    }
}

/// Result of a finished device action dialog.
#[derive(Debug)]
pub struct ActionOutcome {
    pub device_id: DeviceId,
    /// Loan view re-read after the action; `Loading` when the device left the loan.
    pub status: LoanStatusView,
}
