use std::str::FromStr;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::domain::search::EntityKind;
use crate::dto::search::SearchResultsData;
use crate::forms::search::SearchForm;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, local_path, redirect, render_template, run_blocking};
use crate::services::{ServiceError, ServiceResult, search as search_service};

#[derive(Deserialize)]
pub struct ResultsQuery {
    page: Option<usize>,
}

fn render_results(
    result: ServiceResult<SearchResultsData>,
    user: &AuthenticatedUser,
    flash_messages: &IncomingFlashMessages,
    server_config: &ServerConfig,
    tera: &Tera,
) -> HttpResponse {
    match result {
        Ok(data) => {
            let mut context = base_context(
                flash_messages,
                user,
                "search",
                &server_config.auth_service_url,
            );
            context.insert("kind", &data.kind);
            context.insert("search_query", &data.query);
            context.insert("results_url", &data.url);
            context.insert("devices", &data.devices);
            context.insert("shelves", &data.shelves);
            render_template(tera, "search/results.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to load search results: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Search box submission.
///
/// Dispatched searches skip the location change, so results are rendered in
/// place without a redirect. Blank input goes back where it came from.
#[post("/search")]
pub async fn search(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<SearchForm>,
) -> impl Responder {
    let (kind, request) = match search_service::resolve_search(&user, &form) {
        Ok(Some(resolved)) => resolved,
        Ok(None) => {
            let back = req
                .headers()
                .get(header::REFERER)
                .and_then(|value| value.to_str().ok())
                .and_then(local_path)
                .unwrap_or("/devices");
            return redirect(back);
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            return redirect("/na");
        }
        Err(err) => {
            log::error!("Failed to dispatch search: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let load_user = user.clone();
    let [_, text] = request.path;
    let result = run_blocking(move || {
        search_service::load_results(repo.get_ref(), &load_user, kind, &text, 1)
    })
    .await;

    render_results(result, &user, &flash_messages, &server_config, &tera)
}

#[get("/search/{kind}/{text}")]
pub async fn search_results(
    path: web::Path<(String, String)>,
    params: web::Query<ResultsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (kind, text) = path.into_inner();
    let Ok(kind) = EntityKind::from_str(&kind) else {
        return HttpResponse::NotFound().finish();
    };
    let page = params.page.unwrap_or(1);

    let load_user = user.clone();
    let result = run_blocking(move || {
        search_service::load_results(repo.get_ref(), &load_user, kind, &text, page)
    })
    .await;

    render_results(result, &user, &flash_messages, &server_config, &tera)
}
