//! Submitted device action dialogs.

use serde::Deserialize;

use crate::domain::action::{
    DamagedDialog, DeviceAction, ExtendDialog, GuestModeDialog, LostDialog, ResumeLoanDialog,
    UnenrollDialog, complete,
};
use crate::domain::types::DamagedReason;
use crate::forms::{FormError, parse_form_date};

/// Body posted when a device action dialog is confirmed.
#[derive(Debug, Default, Deserialize)]
pub struct DeviceActionForm {
    /// One of `damaged`, `extend`, `guest`, `resume`, `lost`, `unenroll`.
    pub action: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub confirm: bool,
    /// Page to return to once the action is recorded.
    #[serde(default)]
    pub next: Option<String>,
}

impl TryFrom<DeviceActionForm> for DeviceAction {
    type Error = FormError;

    fn try_from(form: DeviceActionForm) -> Result<Self, Self::Error> {
        let confirmed = form.confirm;

        let action = match form.action.as_str() {
            "damaged" => {
                let reason =
                    DamagedReason::new(form.reason).map_err(|_| FormError::InvalidReason)?;
                complete(&mut DamagedDialog::default(), reason, |r| {
                    Some(DeviceAction::Damaged(r))
                })
            }
            "extend" => {
                let due_date = parse_form_date(&form.due_date)?;
                complete(&mut ExtendDialog::default(), due_date, |d| {
                    Some(DeviceAction::Extend(d))
                })
            }
            "guest" => complete(&mut GuestModeDialog::default(), confirmed, |ok| {
                ok.then_some(DeviceAction::GuestMode)
            }),
            "resume" => complete(&mut ResumeLoanDialog::default(), confirmed, |ok| {
                ok.then_some(DeviceAction::ResumeLoan)
            }),
            "lost" => complete(&mut LostDialog::default(), confirmed, |ok| {
                ok.then_some(DeviceAction::Lost)
            }),
            "unenroll" => complete(&mut UnenrollDialog::default(), confirmed, |ok| {
                ok.then_some(DeviceAction::Unenroll)
            }),
            other => return Err(FormError::UnknownAction(other.to_string())),
        };

        action.ok_or(FormError::NotConfirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(action: &str) -> DeviceActionForm {
        DeviceActionForm {
            action: action.to_string(),
            ..DeviceActionForm::default()
        }
    }

    #[test]
    fn damaged_reason_is_sanitized() {
        let mut damaged = form("damaged");
        damaged.reason = "<script>alert(1)</script>cracked screen".into();

        match DeviceAction::try_from(damaged).unwrap() {
            DeviceAction::Damaged(reason) => assert_eq!(reason.as_str(), "cracked screen"),
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn damaged_requires_reason() {
        assert!(matches!(
            DeviceAction::try_from(form("damaged")),
            Err(FormError::InvalidReason)
        ));
    }

    #[test]
    fn extend_parses_new_due_date() {
        let mut extend = form("extend");
        extend.due_date = "2017-04-01".into();

        assert!(matches!(
            DeviceAction::try_from(extend),
            Ok(DeviceAction::Extend(date)) if date.to_string() == "2017-04-01 00:00:00"
        ));
    }

    #[test]
    fn boolean_actions_need_confirmation() {
        assert!(matches!(
            DeviceAction::try_from(form("lost")),
            Err(FormError::NotConfirmed)
        ));

        let mut lost = form("lost");
        lost.confirm = true;
        assert!(matches!(DeviceAction::try_from(lost), Ok(DeviceAction::Lost)));
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(matches!(
            DeviceAction::try_from(form("explode")),
            Err(FormError::UnknownAction(name)) if name == "explode"
        ));
    }
}
