use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt;
use washbay_dashboard::config::{ApiSettings, ServerSettings};
use washbay_dashboard::services::api_client::ApiClient;
use washbay_dashboard::startup::build_router;
use washbay_dashboard::AppState;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_settings() -> ServerSettings {
    ServerSettings {
        host: "127.0.0.1".to_string(),
        port: 0,
        secure_cookies: false,
        session_inactivity_hours: 1,
        static_dir: "static".to_string(),
    }
}

fn app(api_base: &str) -> Router {
    let api = ApiClient::new(ApiSettings {
        base_url: api_base.to_string(),
        timeout_seconds: 5,
    })
    .expect("client builds");
    build_router(AppState::new(Arc::new(api), true), &server_settings())
}

fn fake_token(email: &str) -> String {
    token_expiring_at(email, 4_102_444_800)
}

fn token_expiring_at(email: &str, exp: i64) -> String {
    let claims = json!({ "sub": email, "exp": exp }).to_string();
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.signature",
        general_purpose::URL_SAFE_NO_PAD.encode(claims)
    )
}

fn session_cookie(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("session cookie is set")
        .to_string()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    let body = serde_urlencoded::to_string([("email", email), ("password", password)]).unwrap();
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": fake_token("owner@carwash.test"),
            "token_type": "bearer",
            "roles": ["owner"],
            "permissions": ["view_reports", "manage_invoices"]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn health_check_works() {
    let server = MockServer::start().await;
    let response = app(&server.uri())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn protected_pages_redirect_to_login_without_a_session() {
    let server = MockServer::start().await;
    let response = app(&server.uri())
        .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn login_stores_a_session_and_lands_on_the_dashboard() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let response = app(&server.uri())
        .oneshot(login_request("owner@carwash.test", "secret"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    assert!(session_cookie(&response).starts_with("id="));
}

#[tokio::test]
async fn rejected_credentials_flash_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Incorrect email or password" })))
        .mount(&server)
        .await;
    let app = app(&server.uri());

    let response = app
        .clone()
        .oneshot(login_request("owner@carwash.test", "wrong"))
        .await
        .unwrap();
    assert_eq!(location(&response), "/login");
    let cookie = session_cookie(&response);

    let page = app.oneshot(get_with_cookie("/login", &cookie)).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body_text(page).await.contains("Invalid email or password"));
}

#[tokio::test]
async fn expired_token_clears_the_session() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path_regex("^/(invoices|settings)/.*"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token expired" })))
        .mount(&server)
        .await;
    let app = app(&server.uri());

    let login = app
        .clone()
        .oneshot(login_request("owner@carwash.test", "secret"))
        .await
        .unwrap();
    let cookie = session_cookie(&login);

    let dashboard = app
        .clone()
        .oneshot(get_with_cookie("/dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(dashboard.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&dashboard), "/login");

    let again = app
        .oneshot(get_with_cookie("/invoices", &cookie))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&again), "/login");
}

#[tokio::test]
async fn lapsed_token_ends_the_session_without_calling_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token_expiring_at("owner@carwash.test", 1_000_000_000),
            "token_type": "bearer",
            "roles": ["owner"],
            "permissions": ["view_reports"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/invoices/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(&server.uri());

    let login = app
        .clone()
        .oneshot(login_request("owner@carwash.test", "secret"))
        .await
        .unwrap();
    let cookie = session_cookie(&login);

    let dashboard = app
        .clone()
        .oneshot(get_with_cookie("/dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(dashboard.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&dashboard), "/login");
    let fresh = session_cookie(&dashboard);
    assert_ne!(fresh, cookie);

    let page = app.oneshot(get_with_cookie("/login", &fresh)).await.unwrap();
    assert!(body_text(page).await.contains("Your session has expired"));
}

#[tokio::test]
async fn security_headers_are_applied() {
    let server = MockServer::start().await;
    let response = app(&server.uri())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
    assert!(response.headers().contains_key("x-request-id"));
}
