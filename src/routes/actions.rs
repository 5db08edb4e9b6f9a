use actix_web::{HttpResponse, Responder, post, web};
use actix_web_flash_messages::FlashMessage;

use crate::domain::action::DeviceAction;
use crate::dto::status::ActionOutcome;
use crate::forms::actions::DeviceActionForm;
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::{local_path, redirect, run_blocking};
use crate::services::{ServiceError, actions as actions_service};

/// Confirmation built from the loan as re-read after the action.
fn success_message(action: &DeviceAction, outcome: &ActionOutcome) -> String {
    let status = &outcome.status;
    match action {
        DeviceAction::Extend(requested) => {
            let due_date = status.due_date.unwrap_or(*requested);
            match status.max_extend_date.filter(|_| status.can_extend()) {
                Some(max) => format!(
                    "Loan extended until {}. It can be extended again up to {}.",
                    due_date.format("%Y-%m-%d"),
                    max.format("%Y-%m-%d")
                ),
                None => format!(
                    "Loan extended until {}. It cannot be extended further.",
                    due_date.format("%Y-%m-%d")
                ),
            }
        }
        DeviceAction::Damaged(_) => "Device reported as damaged.".to_string(),
        DeviceAction::Lost => "Device reported as lost and locked.".to_string(),
        DeviceAction::GuestMode if status.guest_enabled => "Guest mode enabled.".to_string(),
        DeviceAction::GuestMode => "Guest mode requested.".to_string(),
        DeviceAction::ResumeLoan => "Loan resumed.".to_string(),
        DeviceAction::Unenroll => {
            format!("Device {} unenrolled.", outcome.device_id)
        }
    }
}

#[post("/device/{device_id}/action")]
pub async fn device_action(
    device_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(mut form): web::Form<DeviceActionForm>,
) -> impl Responder {
    let back = form
        .next
        .take()
        .filter(|next| local_path(next) == Some(next.as_str()))
        .unwrap_or_else(|| "/".to_string());

    let action = match DeviceAction::try_from(form) {
        Ok(action) => action,
        Err(err) => {
            FlashMessage::error(format!("Action rejected: {err}.")).send();
            return redirect(&back);
        }
    };
    let device_id = device_id.into_inner();
    let performed = action.clone();

    match run_blocking(move || {
        actions_service::perform_action(repo.get_ref(), &user, device_id, performed)
    })
    .await
    {
        Ok(outcome) => {
            FlashMessage::success(success_message(&action, &outcome)).send();
            redirect(&back)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Device not found.").send();
            redirect(&back)
        }
        Err(ServiceError::Form(message) | ServiceError::Conflict(message)) => {
            FlashMessage::error(message).send();
            redirect(&back)
        }
        Err(err) => {
            log::error!("Failed to perform device action: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
