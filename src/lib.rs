#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware as actix_middleware, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::middleware::RedirectUnauthorized;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;
#[cfg(feature = "server")]
use crate::routes::actions::device_action;
#[cfg(feature = "server")]
use crate::routes::api::{
    api_v1_device, api_v1_devices, api_v1_search_devices, api_v1_suggestions,
};
#[cfg(feature = "server")]
use crate::routes::devices::{
    assign_device, enroll_device, shelve_devices, show_device, show_devices, upload_devices,
};
#[cfg(feature = "server")]
use crate::routes::main::{logout, not_assigned};
#[cfg(feature = "server")]
use crate::routes::search::{search, search_results};
#[cfg(feature = "server")]
use crate::routes::shelves::{add_shelf, show_shelves, toggle_shelf};
#[cfg(feature = "server")]
use crate::routes::status::{show_status, status_state};

pub mod db;
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod middleware;
pub mod models;
#[cfg(feature = "server")]
pub mod pagination;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

/// Role granting access to the borrower status page.
pub const SERVICE_ACCESS_ROLE: &str = "loaner";
/// Role granting access to device and shelf administration.
pub const SERVICE_ADMIN_ROLE: &str = "loaner_admin";

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::derive_from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting loaner on {}:{}",
        server_config.address,
        server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(actix_middleware::Compress::default())
            .wrap(actix_middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(not_assigned)
            .service(
                web::scope("/api")
                    .service(api_v1_device)
                    .service(api_v1_suggestions)
                    .service(api_v1_devices)
                    .service(api_v1_search_devices),
            )
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(show_status)
                    .service(status_state)
                    .service(device_action)
                    .service(search)
                    .service(search_results)
                    .service(show_devices)
                    .service(enroll_device)
                    .service(upload_devices)
                    .service(shelve_devices)
                    .service(show_device)
                    .service(assign_device)
                    .service(show_shelves)
                    .service(add_shelf)
                    .service(toggle_shelf)
                    .service(logout),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
