use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::dto::shelves::ShelvesQuery;
use crate::forms::shelves::AddShelfForm;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template, run_blocking};
use crate::services::{ServiceError, shelves as shelves_service};

#[get("/shelves")]
pub async fn show_shelves(
    params: web::Query<ShelvesQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let load_user = user.clone();
    let query = params.into_inner();
    match run_blocking(move || shelves_service::list_shelves(repo.get_ref(), &load_user, query))
        .await
    {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "shelves",
                &server_config.auth_service_url,
            );
            context.insert("shelves", &data.shelves);
            context.insert("search_query", &data.search_query);
            render_template(&tera, "shelves/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to list shelves: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/shelves/add")]
pub async fn add_shelf(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddShelfForm>,
) -> impl Responder {
    match run_blocking(move || shelves_service::add_shelf(repo.get_ref(), &user, form)).await {
        Ok(shelf) => {
            FlashMessage::success(format!("Shelf {} added.", shelf.display_name())).send();
            redirect("/shelves")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/shelves")
        }
        Err(ServiceError::Conflict(_)) => {
            FlashMessage::error("A shelf with this location already exists.").send();
            redirect("/shelves")
        }
        Err(err) => {
            log::error!("Failed to add shelf: {err}");
            FlashMessage::error("Failed to add the shelf.").send();
            redirect("/shelves")
        }
    }
}

#[post("/shelves/{shelf_id}/toggle")]
pub async fn toggle_shelf(
    shelf_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let shelf_id = shelf_id.into_inner();
    match run_blocking(move || shelves_service::toggle_shelf(repo.get_ref(), &user, shelf_id)).await
    {
        Ok(shelf) => {
            let state = if shelf.enabled { "enabled" } else { "disabled" };
            FlashMessage::success(format!("Shelf {} {state}.", shelf.display_name())).send();
            redirect("/shelves")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound | ServiceError::TypeConstraint(_)) => {
            FlashMessage::error("Shelf not found.").send();
            redirect("/shelves")
        }
        Err(err) => {
            log::error!("Failed to toggle shelf: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
