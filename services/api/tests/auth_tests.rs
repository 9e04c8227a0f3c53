mod common;

use axum::http::StatusCode;
use common::{session_cookie, TestApp, GOOD_GOOGLE_TOKEN};
use medilog_core::ports::{DatabaseService, PasswordHasher};
use serde_json::{json, Value};

#[tokio::test]
async fn register_signs_in_and_redirects_to_the_role_dashboard() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Cara",
            "email": "cara@example.com",
            "password": "pw-123",
            "role": "caregiver",
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let set_cookie = response.header("set-cookie");
    let set_cookie = set_cookie.to_str().unwrap();
    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));

    let body: Value = response.json();
    assert_eq!(body["redirect"], "/dashboard/caregiver");
    assert_eq!(body["user"]["role"], "caregiver");
    assert_eq!(body["user"]["name"], "Cara");
    assert_eq!(body["user"]["email"], "cara@example.com");
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let app = TestApp::new();
    app.register("dup@example.com", "patient").await;

    let response = app
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Again",
            "email": "dup@example.com",
            "password": "other",
            "role": "caregiver",
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("dup@example.com"));
}

#[tokio::test]
async fn register_requires_an_email() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/auth/register")
        .json(&json!({"name": "", "email": "  ", "password": "pw", "role": "patient"}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn login_uses_the_role_chosen_at_registration() {
    let app = TestApp::new();
    app.register("pat@example.com", "patient").await;

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({
            "email": "pat@example.com",
            "password": "hunter22",
            "role": "caregiver",
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["role"], "patient");
    assert_eq!(body["redirect"], "/dashboard/patient");
}

#[tokio::test]
async fn login_with_a_wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.register("pat@example.com", "patient").await;

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({"email": "pat@example.com", "password": "nope"}))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn login_without_a_profile_is_not_found() {
    let app = TestApp::new();
    let hash = api_lib::adapters::Argon2Hasher::default()
        .hash("pw-456")
        .await
        .unwrap();
    app.db
        .create_credential("orphan@example.com", &hash)
        .await
        .unwrap();

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({"email": "orphan@example.com", "password": "pw-456"}))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn logout_then_protected_pages_redirect_to_login() {
    let app = TestApp::new();
    let cookie = app.register("out@example.com", "patient").await;

    let me = app.server.get("/api/me").add_header("Cookie", cookie.clone()).await;
    me.assert_status_ok();

    let logout = app
        .server
        .post("/auth/logout")
        .add_header("Cookie", cookie.clone())
        .await;
    logout.assert_status_ok();
    let body: Value = logout.json();
    assert_eq!(body["redirect"], "/");
    assert!(logout
        .header("set-cookie")
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));

    let guard = app
        .server
        .get("/api/route-guard")
        .add_query_param("path", "/record")
        .add_header("Cookie", cookie.clone())
        .await;
    let body: Value = guard.json();
    assert_eq!(body["redirect"], "/auth/login");

    app.server
        .get("/api/me")
        .add_header("Cookie", cookie)
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn logout_without_a_session_still_succeeds() {
    let app = TestApp::new();

    let response = app.server.post("/auth/logout").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn signed_in_users_are_sent_from_auth_pages_to_their_dashboard() {
    let app = TestApp::new();
    let cookie = app.register("cg@example.com", "caregiver").await;

    let response = app
        .server
        .get("/api/route-guard")
        .add_query_param("path", "/auth/login")
        .add_header("Cookie", cookie)
        .await;

    let body: Value = response.json();
    assert_eq!(body["redirect"], "/dashboard/caregiver");
}

#[tokio::test]
async fn anonymous_users_may_see_the_landing_page() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/api/route-guard")
        .add_query_param("path", "/")
        .await;

    let body: Value = response.json();
    assert!(body["redirect"].is_null());
}

#[tokio::test]
async fn google_sign_in_is_unavailable_without_a_client_id() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/auth/google")
        .json(&json!({"id_token": GOOD_GOOGLE_TOKEN}))
        .await;

    response.assert_status_service_unavailable();
}

#[tokio::test]
async fn google_sign_in_creates_a_patient_profile_once() {
    let app = TestApp::with_google();

    let first = app
        .server
        .post("/auth/google")
        .json(&json!({"id_token": GOOD_GOOGLE_TOKEN}))
        .await;
    first.assert_status_ok();
    let first_body: Value = first.json();
    assert_eq!(first_body["user"]["role"], "patient");
    assert_eq!(first_body["user"]["name"], "Gwen");
    assert!(session_cookie(&first).starts_with("session="));

    let second = app
        .server
        .post("/auth/google")
        .json(&json!({"id_token": GOOD_GOOGLE_TOKEN}))
        .await;
    let second_body: Value = second.json();
    assert_eq!(first_body["user"]["id"], second_body["user"]["id"]);
}

#[tokio::test]
async fn google_sign_in_rejects_bad_tokens() {
    let app = TestApp::with_google();

    let response = app
        .server
        .post("/auth/google")
        .json(&json!({"id_token": "forged"}))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn the_shell_menu_follows_the_role() {
    let app = TestApp::new();
    let cookie = app.register("cg@example.com", "caregiver").await;

    let response = app
        .server
        .get("/api/shell")
        .add_query_param("path", "/patient-records")
        .add_header("Cookie", cookie)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let menu = body["menu"].as_array().unwrap();
    assert_eq!(menu[0]["href"], "/dashboard/caregiver");
    let active: Vec<&Value> = menu.iter().filter(|i| i["active"] == true).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["href"], "/patient-records");
}
