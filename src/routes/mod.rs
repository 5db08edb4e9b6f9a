//! HTTP handlers and the helpers they share.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use serde::Serialize;
use tera::{Context, Tera};

use crate::models::auth::AuthenticatedUser;
use crate::services::{ServiceError, ServiceResult};

pub mod actions;
pub mod api;
pub mod devices;
pub mod main;
pub mod search;
pub mod shelves;
pub mod status;

/// Maps flash message levels to bootstrap alert classes.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

pub fn ensure_role(user: &AuthenticatedUser, role: &str) -> ServiceResult<()> {
    if check_role(role, &user.roles) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Runs a blocking service call on the actix thread pool.
pub async fn run_blocking<T, F>(call: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(call).await.map_err(|err| {
        log::error!("Blocking task failed: {err}");
        ServiceError::Internal
    })?
}

/// Path component of a same-site URL such as a `Referer` header.
pub fn local_path(url: &str) -> Option<&str> {
    let path = match url.split_once("://") {
        Some((_, rest)) => &rest[rest.find('/')?..],
        None => url,
    };
    let mut chars = path.chars();
    let local = chars.next() == Some('/') && !matches!(chars.next(), Some('/' | '\\'));
    local.then_some(path)
}

#[derive(Serialize)]
struct Alert<'a> {
    message: &'a str,
    level: &'static str,
}

/// Context shared by every page: alerts, current user, active menu entry.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
    home_url: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| Alert {
            message: f.content(),
            level: alert_level_to_str(&f.level()),
        })
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context.insert("home_url", home_url);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok().content_type("text/html").body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// `303 See Other` to `location`, so a POST is followed by a GET.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;

    #[test]
    fn redirect_uses_see_other() {
        let response = redirect("/devices");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/devices"
        );
    }

    #[test]
    fn local_path_strips_origin() {
        assert_eq!(
            local_path("http://loaner.example.com/devices?page=2"),
            Some("/devices?page=2")
        );
        assert_eq!(local_path("/shelves"), Some("/shelves"));
        assert_eq!(local_path("//evil.example.com/"), None);
        assert_eq!(local_path("/\\evil.example.com"), None);
        assert_eq!(local_path("http://loaner.example.com/\\evil.example.com"), None);
        assert_eq!(local_path("/"), Some("/"));
        assert_eq!(local_path("http://loaner.example.com"), None);
    }

    #[test]
    fn alert_levels_map_to_bootstrap_classes() {
        assert_eq!(alert_level_to_str(&Level::Error), "danger");
        assert_eq!(alert_level_to_str(&Level::Warning), "warning");
        assert_eq!(alert_level_to_str(&Level::Success), "success");
        assert_eq!(alert_level_to_str(&Level::Info), "info");
        assert_eq!(alert_level_to_str(&Level::Debug), "info");
    }

    #[test]
    fn roles_are_matched_exactly() {
        let roles = vec!["loaner".to_string()];
        assert!(check_role("loaner", &roles));
        assert!(!check_role("loaner_admin", &roles));
    }

    #[test]
    fn renders_inline_template() {
        let mut tera = Tera::default();
        tera.add_raw_template("hello.html", "Hello {{ name }}")
            .unwrap();
        let mut context = Context::new();
        context.insert("name", "Alex");

        let response = render_template(&tera, "hello.html", &context);
        assert_eq!(response.status(), StatusCode::OK);

        let missing = render_template(&tera, "missing.html", &context);
        assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
