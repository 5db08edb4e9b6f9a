//! Device actions confirmed from the status page dialogs.

use serde_json::{Value, json};

use crate::domain::action::DeviceAction;
use crate::domain::device::{Device, DeviceChanges};
use crate::domain::device_event::{DeviceEventRecord, DeviceEventType};
use crate::domain::loan::LoanStatusView;
use crate::domain::types::DeviceId;
use crate::dto::status::ActionOutcome;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{DeviceReader, DeviceWriter};
use crate::routes::{check_role, ensure_role};
use crate::services::status::StoredDeviceSource;
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE};

struct ActionPlan {
    changes: DeviceChanges,
    event_type: DeviceEventType,
    event_data: Value,
}

fn plan_action(
    device: &Device,
    action: DeviceAction,
    is_admin: bool,
) -> ServiceResult<ActionPlan> {
    let plan = match action {
        DeviceAction::Extend(new_due_date) => {
            let (Some(due_date), Some(max_extend_date)) = (device.due_date, device.max_extend_date)
            else {
                return Err(ServiceError::Conflict("device is not on loan".to_string()));
            };
            if new_due_date <= due_date {
                return Err(ServiceError::Form(
                    "New due date must be after the current due date.".to_string(),
                ));
            }
            if new_due_date > max_extend_date {
                return Err(ServiceError::Form(
                    "New due date is past the maximum extend date.".to_string(),
                ));
            }
            ActionPlan {
                changes: DeviceChanges {
                    due_date: Some(Some(new_due_date)),
                    ..DeviceChanges::default()
                },
                event_type: DeviceEventType::Extended,
                event_data: json!({ "from": due_date, "to": new_due_date }),
            }
        }
        DeviceAction::Damaged(reason) => ActionPlan {
            event_data: json!({ "reason": reason.as_str() }),
            changes: DeviceChanges {
                damaged: Some(true),
                damaged_reason: Some(Some(reason)),
                ..DeviceChanges::default()
            },
            event_type: DeviceEventType::Damaged,
        },
        DeviceAction::Lost => ActionPlan {
            changes: DeviceChanges {
                lost: Some(true),
                locked: Some(true),
                ..DeviceChanges::default()
            },
            event_type: DeviceEventType::Lost,
            event_data: json!({}),
        },
        DeviceAction::GuestMode => {
            if !device.guest_permitted {
                return Err(ServiceError::Form(
                    "Guest mode is not permitted for this device.".to_string(),
                ));
            }
            ActionPlan {
                changes: DeviceChanges {
                    guest_enabled: Some(true),
                    ..DeviceChanges::default()
                },
                event_type: DeviceEventType::GuestModeEnabled,
                event_data: json!({}),
            }
        }
        DeviceAction::ResumeLoan => ActionPlan {
            changes: DeviceChanges {
                pending_return: Some(false),
                ..DeviceChanges::default()
            },
            event_type: DeviceEventType::LoanResumed,
            event_data: json!({}),
        },
        DeviceAction::Unenroll => {
            if !is_admin {
                return Err(ServiceError::Unauthorized);
            }
            ActionPlan {
                changes: DeviceChanges {
                    enrolled: Some(false),
                    assigned_user: Some(None),
                    given_name: Some(None),
                    due_date: Some(None),
                    max_extend_date: Some(None),
                    guest_enabled: Some(false),
                    guest_permitted: Some(false),
                    pending_return: Some(false),
                    ..DeviceChanges::default()
                },
                event_type: DeviceEventType::Unenrolled,
                event_data: json!({
                    "assigned_user": device.assigned_user.as_ref().map(|u| u.as_str()),
                }),
            }
        }
    };

    Ok(plan)
}

/// Applies a finished dialog's action to the device and records it.
///
/// Borrowers may act on their own loan only; admins on any device. The
/// returned view is re-read from storage after the change.
pub fn perform_action<R>(
    repo: &R,
    user: &AuthenticatedUser,
    device_id: i32,
    action: DeviceAction,
) -> ServiceResult<ActionOutcome>
where
    R: DeviceReader + DeviceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let is_admin = check_role(SERVICE_ADMIN_ROLE, &user.roles);
    let actor = user.user_email()?;

    let device = repo
        .get_device_by_id(DeviceId::new(device_id)?)?
        .ok_or(ServiceError::NotFound)?;

    if !is_admin && !device.is_assigned_to(&actor) {
        return Err(ServiceError::Unauthorized);
    }

    let action_name = action.name();
    let plan = plan_action(&device, action, is_admin)?;

    repo.update_device(
        device.id,
        &plan.changes,
        &DeviceEventRecord::new(actor, plan.event_type, plan.event_data),
    )?;
    log::info!("Device {} action {action_name} by {}", device.id, user.email);

    let mut status = LoanStatusView::new();
    match status.on_action_finished(&StoredDeviceSource::new(repo, device.id)) {
        Ok(()) | Err(ServiceError::NotFound) => {}
        Err(err) => return Err(err),
    }

    Ok(ActionOutcome {
        device_id: device.id,
        status,
    })
}
