use actix_identity::{Identity, IdentityMiddleware};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpMessage, HttpRequest, HttpResponse, test, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use chrono::NaiveDate;
use serde_json::json;
use tera::Tera;

use loaner::domain::device::{DeviceChanges, DeviceLoan, NewDevice};
use loaner::domain::device_event::{DeviceEventRecord, DeviceEventType};
use loaner::domain::types::{DeviceId, GivenName, SerialNumber, UserEmail};
use loaner::middleware::RedirectUnauthorized;
use loaner::models::auth::AuthenticatedUser;
use loaner::models::config::ServerConfig;
use loaner::repository::{
    DeviceEventListQuery, DeviceEventReader, DeviceReader, DeviceWriter, DieselRepository,
};
use loaner::routes::actions::device_action;
use loaner::routes::devices::show_devices;
use loaner::routes::main::not_assigned;
use loaner::routes::search::{search, search_results};
use loaner::routes::shelves::show_shelves;
use loaner::routes::status::show_status;

mod common;

const FLASH_COOKIE: &str = "_flash";
const SECRET: &str = "test-secret-test-secret-test-secret-test-secret-test-secret-test";

fn server_config() -> ServerConfig {
    ServerConfig {
        domain: "localhost".to_string(),
        address: "127.0.0.1".to_string(),
        port: 8080,
        database_url: String::new(),
        templates_dir: "templates/**/*".to_string(),
        secret: SECRET.to_string(),
        auth_service_url: "http://localhost/auth/signin".to_string(),
        refresh_timeout_secs: 5,
    }
}

fn token(email: &str, roles: &[&str]) -> String {
    AuthenticatedUser {
        sub: "1".to_string(),
        email: email.to_string(),
        name: "Alex Borrower".to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: 4_102_444_800,
    }
    .to_jwt(SECRET)
    .unwrap()
}

async fn sign_in(req: HttpRequest, token: web::Path<String>) -> HttpResponse {
    match Identity::login(&req.extensions(), token.into_inner()) {
        Ok(_) => HttpResponse::Ok().finish(),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}

fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Enrolls `SN-1` and loans it to borrower@example.com.
fn seed_loan(repo: &DieselRepository) -> DeviceId {
    let admin = UserEmail::new("admin@example.com").unwrap();
    let serial = SerialNumber::new("SN-1").unwrap();
    let device = repo
        .create_devices(
            &[NewDevice::new(serial, None, None)],
            &DeviceEventRecord::new(admin.clone(), DeviceEventType::Enrolled, json!({})),
        )
        .unwrap()
        .remove(0);

    let loan = DeviceLoan {
        assigned_user: UserEmail::new("borrower@example.com").unwrap(),
        given_name: GivenName::new("Alex").unwrap(),
        due_date: date(2017, 3, 27),
        max_extend_date: date(2017, 4, 1),
        guest_permitted: true,
    };
    repo.update_device(
        device.id,
        &DeviceChanges::from(loan),
        &DeviceEventRecord::new(admin, DeviceEventType::Assigned, json!({})),
    )
    .unwrap();
    device.id
}

macro_rules! test_app {
    ($repo:expr) => {{
        let key = Key::derive_from(SECRET.as_bytes());
        let flash = FlashMessagesFramework::builder(CookieMessageStore::builder(key.clone()).build())
            .build();
        test::init_service(
            App::new()
                .wrap(flash)
                .wrap(IdentityMiddleware::default())
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), key)
                        .cookie_secure(false)
                        .build(),
                )
                .route("/test/signin/{token}", web::get().to(sign_in))
                .service(not_assigned)
                .service(
                    web::scope("")
                        .wrap(RedirectUnauthorized)
                        .service(show_status)
                        .service(device_action)
                        .service(search)
                        .service(search_results)
                        .service(show_devices)
                        .service(show_shelves),
                )
                .app_data(web::Data::new(Tera::new("templates/**/*").unwrap()))
                .app_data(web::Data::new($repo))
                .app_data(web::Data::new(server_config())),
        )
        .await
    }};
}

macro_rules! signed_in_cookies {
    ($app:expr, $token:expr) => {{
        let req = test::TestRequest::get()
            .uri(&format!("/test/signin/{}", $token))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        // Session cookie only; the flash store's removal cookie is not replayed.
        resp.response()
            .cookies()
            .filter(|cookie| cookie.name() != FLASH_COOKIE && !cookie.value().is_empty())
            .map(Cookie::into_owned)
            .collect::<Vec<_>>()
    }};
}

fn with_cookies(mut req: test::TestRequest, cookies: &[Cookie<'static>]) -> test::TestRequest {
    for cookie in cookies {
        req = req.cookie(cookie.clone());
    }
    req
}

#[actix_web::test]
async fn anonymous_status_redirects_to_signin() {
    let test_db = common::TestDb::new("anonymous_status.db");
    let app = test_app!(DieselRepository::new(test_db.pool()));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/auth/signin");
}

#[actix_web::test]
async fn status_without_role_redirects_to_not_assigned() {
    let test_db = common::TestDb::new("status_without_role.db");
    let app = test_app!(DieselRepository::new(test_db.pool()));
    let cookies = signed_in_cookies!(app, token("borrower@example.com", &["inventory"]));

    let req = with_cookies(test::TestRequest::get().uri("/"), &cookies).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/na");
}

#[actix_web::test]
async fn status_without_loan_shows_loader() {
    let test_db = common::TestDb::new("status_without_loan.db");
    let app = test_app!(DieselRepository::new(test_db.pool()));
    let cookies = signed_in_cookies!(app, token("borrower@example.com", &["loaner"]));

    let req = with_cookies(test::TestRequest::get().uri("/"), &cookies).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("loan-loader"));
}

#[actix_web::test]
async fn status_shows_loan_and_actions() {
    let test_db = common::TestDb::new("status_shows_loan.db");
    let repo = DieselRepository::new(test_db.pool());
    let device_id = seed_loan(&repo);
    let app = test_app!(repo);
    let cookies = signed_in_cookies!(app, token("borrower@example.com", &["loaner"]));

    let req = with_cookies(test::TestRequest::get().uri("/"), &cookies).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(!body.contains("loan-loader"));
    assert!(body.contains("2017-03-27"));
    assert!(body.contains("Extend loan"));
    assert!(body.contains("Enable guest mode"));
    assert!(!body.contains("Unenroll"));
    assert!(body.contains(&format!("/device/{device_id}/action")));
}

#[actix_web::test]
async fn extend_action_moves_due_date() {
    let test_db = common::TestDb::new("extend_action.db");
    let repo = DieselRepository::new(test_db.pool());
    let device_id = seed_loan(&repo);
    let app = test_app!(repo.clone());
    let cookies = signed_in_cookies!(app, token("borrower@example.com", &["loaner"]));

    let req = with_cookies(
        test::TestRequest::post().uri(&format!("/device/{device_id}/action")),
        &cookies,
    )
    .set_form([("action", "extend"), ("due_date", "2017-03-30"), ("next", "/")])
    .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let device = repo.get_device_by_id(device_id).unwrap().unwrap();
    assert_eq!(device.due_date, Some(date(2017, 3, 30)));

    let (total, events) = repo
        .list_device_events(
            DeviceEventListQuery::new(device_id).event_type(DeviceEventType::Extended),
        )
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(events[0].actor_email.as_str(), "borrower@example.com");
}

#[actix_web::test]
async fn extend_past_max_is_rejected() {
    let test_db = common::TestDb::new("extend_past_max.db");
    let repo = DieselRepository::new(test_db.pool());
    let device_id = seed_loan(&repo);
    let app = test_app!(repo.clone());
    let cookies = signed_in_cookies!(app, token("borrower@example.com", &["loaner"]));

    let req = with_cookies(
        test::TestRequest::post().uri(&format!("/device/{device_id}/action")),
        &cookies,
    )
    .set_form([("action", "extend"), ("due_date", "2017-04-05")])
    .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let device = repo.get_device_by_id(device_id).unwrap().unwrap();
    assert_eq!(device.due_date, Some(date(2017, 3, 27)));
}

#[actix_web::test]
async fn filtered_admin_lists_render() {
    let test_db = common::TestDb::new("filtered_lists.db");
    let repo = DieselRepository::new(test_db.pool());
    seed_loan(&repo);
    let app = test_app!(repo);
    let cookies = signed_in_cookies!(
        app,
        token("admin@example.com", &["loaner", "loaner_admin"])
    );

    for uri in [
        "/devices?search=serial_number%3ASN-1",
        "/shelves?search=location%3AUS%2FNYC",
    ] {
        let req = with_cookies(test::TestRequest::get().uri(uri), &cookies).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }
}

#[actix_web::test]
async fn search_results_accept_encoded_slashes() {
    let test_db = common::TestDb::new("search_encoded.db");
    let app = test_app!(DieselRepository::new(test_db.pool()));
    let cookies = signed_in_cookies!(
        app,
        token("admin@example.com", &["loaner", "loaner_admin"])
    );

    let req = with_cookies(
        test::TestRequest::get().uri("/search/shelf/location%3AUS%2FNYC?page=2"),
        &cookies,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Shelf matching"));
}

#[actix_web::test]
async fn submitted_search_renders_in_place() {
    let test_db = common::TestDb::new("search_in_place.db");
    let repo = DieselRepository::new(test_db.pool());
    seed_loan(&repo);
    let app = test_app!(repo);
    let cookies = signed_in_cookies!(
        app,
        token("admin@example.com", &["loaner", "loaner_admin"])
    );

    let req = with_cookies(test::TestRequest::post().uri("/search"), &cookies)
        .set_form([("q", "SN-1")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::LOCATION).is_none());
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("/devices/"));

    let req = with_cookies(test::TestRequest::post().uri("/search"), &cookies)
        .insert_header((header::REFERER, "/shelves"))
        .set_form([("q", "   ")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/shelves");
}
