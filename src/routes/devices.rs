use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::dto::devices::DevicesQuery;
use crate::forms::devices::{AssignDeviceForm, EnrollDeviceForm, UploadDevicesForm};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template, run_blocking};
use crate::services::{ServiceError, devices as devices_service};

#[derive(Deserialize)]
pub struct DeviceQuery {
    page: Option<usize>,
}

/// Flash and redirect for failed device mutations.
fn mutation_failed(err: ServiceError, back: &str, what: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        ServiceError::NotFound => {
            FlashMessage::error("Device or shelf not found.").send();
            redirect("/devices")
        }
        ServiceError::Form(message) | ServiceError::Conflict(message) => {
            FlashMessage::error(message).send();
            redirect(back)
        }
        err => {
            log::error!("Failed to {what}: {err}");
            FlashMessage::error(format!("Failed to {what}.")).send();
            redirect(back)
        }
    }
}

#[get("/devices")]
pub async fn show_devices(
    params: web::Query<DevicesQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let load_user = user.clone();
    let query = params.into_inner();
    match run_blocking(move || devices_service::list_devices(repo.get_ref(), &load_user, query))
        .await
    {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "devices",
                &server_config.auth_service_url,
            );
            context.insert("devices", &data.devices);
            context.insert("search_query", &data.search_query);
            context.insert("shelves", &data.shelves);
            render_template(&tera, "devices/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to list devices: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/devices/{device_id}")]
pub async fn show_device(
    device_id: web::Path<i32>,
    params: web::Query<DeviceQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let load_user = user.clone();
    let device_id = device_id.into_inner();
    let page = params.page.unwrap_or(1);
    match run_blocking(move || {
        devices_service::load_device(repo.get_ref(), &load_user, device_id, page)
    })
    .await
    {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "devices",
                &server_config.auth_service_url,
            );
            context.insert("device", &data.device);
            context.insert("shelf", &data.shelf);
            context.insert("events", &data.events);
            context.insert("shelves", &data.shelves);
            render_template(&tera, "devices/device.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound | ServiceError::TypeConstraint(_)) => {
            FlashMessage::error("Device not found.").send();
            redirect("/devices")
        }
        Err(err) => {
            log::error!("Failed to load device: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/devices/enroll")]
pub async fn enroll_device(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<EnrollDeviceForm>,
) -> impl Responder {
    match run_blocking(move || devices_service::enroll_device(repo.get_ref(), &user, form)).await {
        Ok(device) => {
            FlashMessage::success(format!("Device {} enrolled.", device.serial_number)).send();
            redirect(&format!("/devices/{}", device.id))
        }
        Err(err) => mutation_failed(err, "/devices", "enroll the device"),
    }
}

#[post("/devices/upload")]
pub async fn upload_devices(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadDevicesForm>,
) -> impl Responder {
    let result = run_blocking(move || {
        let mut form = form;
        devices_service::upload_devices(repo.get_ref(), &user, &mut form)
    })
    .await;

    match result {
        Ok(count) => {
            FlashMessage::success(format!("{count} device(s) enrolled.")).send();
            redirect("/devices")
        }
        Err(err) => mutation_failed(err, "/devices", "enroll the devices"),
    }
}

#[post("/devices/{device_id}/assign")]
pub async fn assign_device(
    device_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AssignDeviceForm>,
) -> impl Responder {
    let device_id = device_id.into_inner();
    let back = format!("/devices/{device_id}");
    match run_blocking(move || {
        devices_service::assign_device(repo.get_ref(), &user, device_id, form)
    })
    .await
    {
        Ok(device) => {
            FlashMessage::success(format!("Device {} loaned.", device.serial_number)).send();
            redirect(&back)
        }
        Err(err) => mutation_failed(err, &back, "loan the device"),
    }
}

#[post("/devices/shelve")]
pub async fn shelve_devices(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Bytes,
) -> impl Responder {
    match run_blocking(move || {
        devices_service::shelve_devices(repo.get_ref(), &user, form.as_ref())
    })
    .await
    {
        Ok(count) => {
            FlashMessage::success(format!("{count} device(s) shelved.")).send();
            redirect("/devices")
        }
        Err(err) => mutation_failed(err, "/devices", "shelve the devices"),
    }
}
