//! Device action dialogs shown on the borrower status page.
//!
//! Every action follows the same lifecycle: the dialog is opened, the user
//! confirms (finishing the dialog with an outcome) or closes it. The status
//! page only cares about finished outcomes, which trigger a loan refresh.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::DamagedReason;

/// Lifecycle of a device action dialog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum DialogState {
    #[default]
    Closed,
    Open,
    Finished,
}

/// Shared capability of all device action dialogs.
pub trait DeviceActionDialog {
    type Outcome;

    fn open_dialog(&mut self);

    /// Marks the dialog as finished and yields its outcome, if one was recorded.
    fn finished(&mut self) -> Option<Self::Outcome>;

    fn close(&mut self);
}

/// Dialog carrying an outcome of type `O`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionDialog<O> {
    state: DialogState,
    outcome: Option<O>,
}

impl<O> Default for ActionDialog<O> {
    fn default() -> Self {
        Self {
            state: DialogState::Closed,
            outcome: None,
        }
    }
}

impl<O> ActionDialog<O> {
    pub fn state(&self) -> DialogState {
        self.state
    }

    /// Records the user's confirmation while the dialog is open.
    ///
    /// Ignored when the dialog is not open.
    pub fn confirm(&mut self, outcome: O) {
        if self.state == DialogState::Open {
            self.outcome = Some(outcome);
        }
    }
}

impl<O> DeviceActionDialog for ActionDialog<O> {
    type Outcome = O;

    fn open_dialog(&mut self) {
        self.state = DialogState::Open;
        self.outcome = None;
    }

    fn finished(&mut self) -> Option<O> {
        if self.state != DialogState::Open {
            return None;
        }
        let outcome = self.outcome.take()?;
        self.state = DialogState::Finished;
        Some(outcome)
    }

    fn close(&mut self) {
        self.state = DialogState::Closed;
        self.outcome = None;
    }
}

pub type DamagedDialog = ActionDialog<DamagedReason>;
pub type ExtendDialog = ActionDialog<NaiveDateTime>;
pub type GuestModeDialog = ActionDialog<bool>;
pub type ResumeLoanDialog = ActionDialog<bool>;
pub type LostDialog = ActionDialog<bool>;
pub type UnenrollDialog = ActionDialog<bool>;

/// Confirmed device action with its payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceAction {
    Damaged(DamagedReason),
    Extend(NaiveDateTime),
    GuestMode,
    ResumeLoan,
    Lost,
    Unenroll,
}

impl DeviceAction {
    pub fn name(&self) -> &'static str {
        match self {
            DeviceAction::Damaged(_) => "damaged",
            DeviceAction::Extend(_) => "extend",
            DeviceAction::GuestMode => "guest",
            DeviceAction::ResumeLoan => "resume",
            DeviceAction::Lost => "lost",
            DeviceAction::Unenroll => "unenroll",
        }
    }
}

/// Runs `dialog` through open → confirm → finished, mapping its outcome to an action.
///
/// Boolean dialogs only produce an action when confirmed with `true`.
pub fn complete<O, F>(
    dialog: &mut ActionDialog<O>,
    outcome: O,
    into_action: F,
) -> Option<DeviceAction>
where
    F: FnOnce(O) -> Option<DeviceAction>,
{
    dialog.open_dialog();
    dialog.confirm(outcome);
    let action = dialog.finished().and_then(into_action);
    if action.is_none() {
        dialog.close();
    }
    action
}

/// Canned dialogs that finish immediately with fixed outcomes.
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks {
    use chrono::NaiveDate;

    use super::*;

    pub fn damaged() -> DamagedDialog {
        finished_with(DamagedReason::new("damagedReason").expect("valid reason"))
    }

    pub fn extend() -> ExtendDialog {
        finished_with(
            NaiveDate::from_ymd_opt(2017, 4, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .expect("valid date"),
        )
    }

    pub fn guest_mode() -> GuestModeDialog {
        finished_with(true)
    }

    pub fn resume_loan() -> ResumeLoanDialog {
        finished_with(true)
    }

    pub fn lost() -> LostDialog {
        finished_with(true)
    }

    pub fn unenroll() -> UnenrollDialog {
        finished_with(true)
    }

    fn finished_with<O>(outcome: O) -> ActionDialog<O> {
        let mut dialog = ActionDialog::default();
        dialog.open_dialog();
        dialog.confirm(outcome);
        dialog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_yields_outcome_once() {
        let mut dialog = mocks::guest_mode();
        assert_eq!(dialog.finished(), Some(true));
        assert_eq!(dialog.state(), DialogState::Finished);
        assert_eq!(dialog.finished(), None);
    }

    #[test]
    fn closed_dialog_ignores_confirmation() {
        let mut dialog = LostDialog::default();
        dialog.confirm(true);
        assert_eq!(dialog.finished(), None);
        assert_eq!(dialog.state(), DialogState::Closed);
    }

    #[test]
    fn close_discards_pending_outcome() {
        let mut dialog = mocks::damaged();
        dialog.close();
        assert_eq!(dialog.finished(), None);
    }

    #[test]
    fn mocks_report_their_outcomes() {
        assert_eq!(mocks::damaged().finished().unwrap().as_str(), "damagedReason");
        assert!(mocks::extend().finished().is_some());
        assert_eq!(mocks::resume_loan().finished(), Some(true));
        assert_eq!(mocks::lost().finished(), Some(true));
        assert_eq!(mocks::unenroll().finished(), Some(true));
    }

    #[test]
    fn complete_maps_confirmed_bool_to_action() {
        let mut dialog = LostDialog::default();
        let action = complete(&mut dialog, true, |ok| ok.then_some(DeviceAction::Lost));
        assert_eq!(action, Some(DeviceAction::Lost));
        assert_eq!(dialog.state(), DialogState::Finished);
    }

    #[test]
    fn complete_with_declined_bool_closes_dialog() {
        let mut dialog = UnenrollDialog::default();
        let action = complete(&mut dialog, false, |ok| ok.then_some(DeviceAction::Unenroll));
        assert_eq!(action, None);
        assert_eq!(dialog.state(), DialogState::Closed);
    }
}
