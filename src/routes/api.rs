use actix_web::{HttpResponse, Responder, get, post, web};

use crate::domain::query::SearchRequest;
use crate::dto::api::{DevicesApiQuery, SuggestionsQuery};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::run_blocking;
use crate::services::{ServiceError, api as api_service, search as search_service};

fn error_response(err: ServiceError, what: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Unauthorized().finish(),
        ServiceError::NotFound => HttpResponse::NotFound().finish(),
        err => {
            log::error!("Failed to {what}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Device info of the signed-in borrower's loan.
#[get("/v1/device")]
pub async fn api_v1_device(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match run_blocking(move || api_service::current_device(repo.get_ref(), &user)).await {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(err) => error_response(err, "load device info"),
    }
}

#[get("/v1/search/suggestions")]
pub async fn api_v1_suggestions(
    params: web::Query<SuggestionsQuery>,
    user: AuthenticatedUser,
) -> impl Responder {
    match search_service::suggestions(&user, &params.q) {
        Ok(suggestions) => HttpResponse::Ok().json(suggestions),
        Err(err) => error_response(err, "build suggestions"),
    }
}

#[get("/v1/devices")]
pub async fn api_v1_devices(
    params: web::Query<DevicesApiQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let query = params.into_inner();
    match run_blocking(move || api_service::list_devices(repo.get_ref(), &user, query)).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => error_response(err, "list devices"),
    }
}

#[post("/v1/devices/search")]
pub async fn api_v1_search_devices(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(request): web::Json<SearchRequest>,
) -> impl Responder {
    match run_blocking(move || api_service::search_devices(repo.get_ref(), &user, &request)).await
    {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => error_response(err, "search devices"),
    }
}
