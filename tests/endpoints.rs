use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, TimeDelta};
use comment_box::auth::hasher::CredentialHasher;
use comment_box::clock::ManualClock;
use comment_box::models::LockoutPolicy;
use comment_box::repository::Repository;
use comment_box::state::SharedState;
use std::sync::Arc;
use tower::ServiceExt;

const REGISTER_ALICE: &str = "username=alice&password=Abcdef1%21&action=register";
const LOGIN_ALICE: &str = "username=alice&password=Abcdef1%21&action=login";
const WRONG_LOGIN_ALICE: &str = "username=alice&password=Wrong1%21pass&action=login";
const COMMENT_PANEL: &str = r#"action="/comment""#;

fn app() -> (Router, Arc<ManualClock>) {
    let hasher = CredentialHasher::new(argon2::Params::MIN_M_COST, 1).unwrap();
    let clock = Arc::new(ManualClock::starting_at(
        DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    ));
    let repository = Repository::new(hasher, LockoutPolicy::default(), clock.clone());
    (comment_box::router(SharedState { repository }), clock)
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn register_and_login(app: &Router) {
    let (status, _) = send(app, form("/account", REGISTER_ALICE)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app, form("/account", LOGIN_ALICE)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn root_shows_only_the_credentials_form() {
    let (app, _) = app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"action="/account""#));
    assert!(!body.contains(COMMENT_PANEL));
}

#[tokio::test]
async fn register_reports_success_then_duplicate() {
    let (app, _) = app();

    let (status, body) = send(&app, form("/account", REGISTER_ALICE)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("User registered"));
    assert!(body.contains(r#"value="alice""#));

    let (status, body) = send(&app, form("/account", REGISTER_ALICE)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("User already exists"));
}

#[tokio::test]
async fn weak_password_is_reported() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        form("/account", "username=bob&password=abc&action=register"),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Password must be at least 8 characters long"));
}

#[tokio::test]
async fn login_of_unknown_user_is_not_found() {
    let (app, _) = app();
    let (status, body) = send(&app, form("/account", LOGIN_ALICE)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("User not found"));
    assert!(!body.contains(COMMENT_PANEL));
}

#[tokio::test]
async fn login_opens_the_comment_panel() {
    let (app, _) = app();
    send(&app, form("/account", REGISTER_ALICE)).await;

    let (status, body) = send(&app, form("/account", LOGIN_ALICE)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Login successful"));
    assert!(body.contains(COMMENT_PANEL));
}

#[tokio::test]
async fn repeated_failures_lock_the_account_over_http() {
    let (app, clock) = app();
    send(&app, form("/account", REGISTER_ALICE)).await;

    for _ in 0..4 {
        let (status, body) = send(&app, form("/account", WRONG_LOGIN_ALICE)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid credentials"));
    }

    let (status, body) = send(&app, form("/account", WRONG_LOGIN_ALICE)).await;
    assert_eq!(status, StatusCode::LOCKED);
    assert!(body.contains("Account locked after too many failed attempts."));

    let (status, body) = send(&app, form("/account", LOGIN_ALICE)).await;
    assert_eq!(status, StatusCode::LOCKED);
    assert!(body.contains("Account locked. Try again later."));
    assert!(!body.contains(COMMENT_PANEL));

    clock.advance(TimeDelta::minutes(5));
    let (status, _) = send(&app, form("/account", LOGIN_ALICE)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn comment_without_session_is_redirected_and_ignored() {
    let (app, _) = app();
    let response = app
        .clone()
        .oneshot(form("/comment", "comment=hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    register_and_login(&app).await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (_, body) = send(&app, request).await;
    assert!(!body.contains(r#"<p class="message">hello</p>"#));
}

#[tokio::test]
async fn comment_is_sanitized_before_display() {
    let (app, _) = app();
    register_and_login(&app).await;

    let (status, body) = send(
        &app,
        form(
            "/comment",
            "comment=%3Cscript%3Ealert(1)%3C%2Fscript%3Ehello",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<p class="message">hello</p>"#));
    assert!(!body.contains("<script>"));
}

#[tokio::test]
async fn empty_comment_is_rejected() {
    let (app, _) = app();
    register_and_login(&app).await;

    let (status, body) = send(&app, form("/comment", "comment=")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("You cannot send an empty message"));
    assert!(!body.contains(r#"<p class="message">"#));
}

#[tokio::test]
async fn messages_render_in_submission_order() {
    let (app, _) = app();
    register_and_login(&app).await;

    send(&app, form("/comment", "comment=a")).await;
    let (_, body) = send(&app, form("/comment", "comment=b")).await;

    let first = body.find(r#"<p class="message">a</p>"#).unwrap();
    let second = body.find(r#"<p class="message">b</p>"#).unwrap();
    assert!(first < second);
}
