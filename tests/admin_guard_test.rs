mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use tower::ServiceExt;
use versequiz::db::Db;
use versequiz::email::ResendEmailSender;
use versequiz::federated::{FederatedConfig, OAuthVerifier};
use versequiz::services::auth::AuthService;
use versequiz::services::quiz::QuizService;
use versequiz::{names, router, AppState};

fn app(db: Db) -> axum::Router {
    let auth = AuthService::new(
        db.clone(),
        ResendEmailSender::new(String::new()),
        "http://localhost:1414".to_string(),
    );
    let quiz = QuizService::new(db.clone());
    router(AppState {
        db,
        auth,
        quiz,
        federated: OAuthVerifier::new(FederatedConfig::default()),
        secure_cookies: false,
    })
}

/// Register an account and hand back a live session token, optionally with
/// the admin flag set.
async fn session_for(db: &Db, email: &str, admin: bool) -> String {
    let account_id = db
        .create_account(email, "password123", "Tester")
        .await
        .expect("create account");
    if admin {
        db.promote_to_admin(email).await.expect("promote account");
    }
    db.create_account_session(account_id)
        .await
        .expect("create session")
}

#[tokio::test]
async fn admin_pages_reject_browsers_without_a_session() {
    let app = app(common::create_test_db().await);

    let pages = [
        names::ADMIN_URL,
        names::ADMIN_QUESTIONS_URL,
        names::ADMIN_NEW_QUESTION_URL,
        names::ADMIN_IMPORT_URL,
        names::ADMIN_USERS_URL,
    ];

    for uri in pages {
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("request build should succeed");
        let resp = app.clone().oneshot(req).await.expect("router should respond");

        assert_eq!(
            resp.status(),
            StatusCode::UNAUTHORIZED,
            "expected UNAUTHORIZED for {uri}",
        );
    }
}

#[tokio::test]
async fn admin_pages_reject_signed_in_non_admins() {
    let db = common::create_test_db().await;
    let session = session_for(&db, "plain@example.com", false).await;
    let app = app(db);

    let req = Request::builder()
        .method(Method::GET)
        .uri(names::ADMIN_URL)
        .header(
            header::COOKIE,
            format!("{}={}", names::SESSION_COOKIE_NAME, session),
        )
        .body(Body::empty())
        .expect("request build should succeed");
    let resp = app.oneshot(req).await.expect("router should respond");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_pages_accept_admin_sessions() {
    let db = common::create_test_db().await;
    let session = session_for(&db, "admin@example.com", true).await;
    let app = app(db);

    for uri in [names::ADMIN_URL, names::ADMIN_QUESTIONS_URL] {
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(
                header::COOKIE,
                format!("{}={}", names::SESSION_COOKIE_NAME, session),
            )
            .body(Body::empty())
            .expect("request build should succeed");
        let resp = app.clone().oneshot(req).await.expect("router should respond");

        assert_eq!(resp.status(), StatusCode::OK, "expected OK for {uri}");
    }
}

#[tokio::test]
async fn mutating_admin_routes_sit_behind_the_same_guard() {
    let app = app(common::create_test_db().await);

    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/admin/questions/1")
        .header("HX-Request", "true")
        .body(Body::empty())
        .expect("request build should succeed");
    let resp = app.oneshot(req).await.expect("router should respond");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn state_changing_requests_need_the_htmx_marker() {
    let app = app(common::create_test_db().await);

    // Without the HX-Request header the middleware rejects the post
    let req = Request::builder()
        .method(Method::POST)
        .uri(names::SET_NAME_URL)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Ada"}"#))
        .expect("request build should succeed");
    let resp = app.clone().oneshot(req).await.expect("router should respond");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // With it, the same request goes through
    let req = Request::builder()
        .method(Method::POST)
        .uri(names::SET_NAME_URL)
        .header("HX-Request", "true")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Ada"}"#))
        .expect("request build should succeed");
    let resp = app.oneshot(req).await.expect("router should respond");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn the_login_page_is_public() {
    let app = app(common::create_test_db().await);

    let req = Request::builder()
        .method(Method::GET)
        .uri(names::ADMIN_LOGIN_URL)
        .body(Body::empty())
        .expect("request build should succeed");
    let resp = app.oneshot(req).await.expect("router should respond");

    assert_eq!(resp.status(), StatusCode::OK);
}
