use std::time::Duration;

use actix_web::rt::time::timeout;
use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::dto::status::StatusPageData;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template, run_blocking};
use crate::services::{ServiceError, status as status_service};

/// Borrower status page.
///
/// The loan is loaded within `refresh_timeout_secs`; a slow or failed load
/// renders the loader instead of blocking the page.
#[get("/")]
pub async fn show_status(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let limit = Duration::from_secs(server_config.refresh_timeout_secs);
    let load_user = user.clone();
    let load = run_blocking(move || status_service::load_status(repo.get_ref(), &load_user));

    let (data, load_failed) = match timeout(limit, load).await {
        Ok(Ok(data)) => (data, false),
        Ok(Err(ServiceError::Unauthorized)) => {
            FlashMessage::error("Insufficient permissions.").send();
            return redirect("/na");
        }
        Ok(Err(err)) => {
            log::error!("Failed to load loan status for {}: {err}", user.email);
            (StatusPageData::loading(), true)
        }
        Err(_) => {
            log::warn!("Loan status for {} timed out after {limit:?}", user.email);
            (StatusPageData::loading(), false)
        }
    };

    let mut context = base_context(
        &flash_messages,
        &user,
        "status",
        &server_config.auth_service_url,
    );
    context.insert("status", &data.status);
    context.insert("state", &data.state);
    context.insert("can_extend", &data.can_extend);
    context.insert("device_id", &data.device_id);
    context.insert("actions", &data.actions);
    context.insert("load_failed", &load_failed);

    render_template(&tera, "status/index.html", &context)
}

/// Loan state polled by the loader until the loan is ready.
#[get("/status/state")]
pub async fn status_state(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match run_blocking(move || status_service::load_status(repo.get_ref(), &user)).await {
        Ok(data) => HttpResponse::Ok().json(data.state),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(err) => {
            log::error!("Failed to load loan state: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
