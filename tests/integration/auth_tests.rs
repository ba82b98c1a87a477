//! Login, logout and session handling.

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestResponse;
use crate::common::{assert_redirect_to, test_app};

/// `name=value` part of the response's `Set-Cookie` header.
fn session_cookie(response: &TestResponse) -> HeaderValue {
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("no Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string();
    let pair = set_cookie.split(';').next().unwrap().to_string();
    HeaderValue::from_str(&pair).unwrap()
}

#[tokio::test]
async fn test_login_form_renders() {
    let app = test_app();

    let response = app.server.get("/login").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains(r#"data-view="login""#));
    assert!(html.contains(r#"name="password""#));
}

#[tokio::test]
async fn test_login_then_view_dashboard() {
    let app = test_app();
    app.create_user("steve", "creeper");

    let response = app
        .server
        .post("/login")
        .form(&[("username", "steve"), ("password", "creeper")])
        .await;

    assert_redirect_to(&response, "/dashboard");
    let cookie = session_cookie(&response);
    assert!(cookie.to_str().unwrap().starts_with("solder_session="));

    let dashboard = app
        .server
        .get("/dashboard")
        .add_header(header::COOKIE, cookie)
        .await;

    assert_eq!(dashboard.status_code(), StatusCode::OK);
    assert!(dashboard.text().contains("steve"));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let app = test_app();
    app.create_user("steve", "creeper");

    let response = app
        .server
        .post("/login")
        .form(&[("username", "steve"), ("password", "zombie")])
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get("set-cookie").is_none());
    let html = response.text();
    assert!(html.contains("These credentials do not match our records."));
    assert!(html.contains(r#"value="steve""#));
}

#[tokio::test]
async fn test_unknown_user_is_rejected() {
    let app = test_app();

    let response = app
        .server
        .post("/login")
        .form(&[("username", "herobrine"), ("password", "anything")])
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signed_in_user_skips_login_form() {
    let app = test_app();
    let user = app.create_session_user("steve");

    let response = app.get_as("/login", &user).await;

    assert_redirect_to(&response, "/dashboard");
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let app = test_app();
    let user = app.create_session_user("steve");
    let cookie = app.acting_as(&user);

    let before = app
        .server
        .get("/dashboard")
        .add_header(header::COOKIE, cookie.clone())
        .await;
    assert_eq!(before.status_code(), StatusCode::OK);

    let logout = app
        .server
        .post("/logout")
        .add_header(header::COOKIE, cookie.clone())
        .await;
    assert_redirect_to(&logout, "/login");
    let expired = logout.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(expired.contains("Max-Age=0"));

    let after = app
        .server
        .get("/dashboard")
        .add_header(header::COOKIE, cookie)
        .await;
    assert_redirect_to(&after, "/login");
}

#[tokio::test]
async fn test_forged_session_is_redirected() {
    let app = test_app();
    app.create_session_user("steve");

    let response = app
        .server
        .get("/dashboard")
        .add_header(
            header::COOKIE,
            HeaderValue::from_static("solder_session=not-a-real-token"),
        )
        .await;

    assert_redirect_to(&response, "/login");
}

#[tokio::test]
async fn test_session_cookie_is_http_only() {
    let app = test_app();
    app.create_user("alex", "enderman");

    let response = app
        .server
        .post("/login")
        .form(&[("username", "alex"), ("password", "enderman")])
        .await;

    let set_cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
}

#[tokio::test]
async fn test_blank_username_is_a_bad_request() {
    let app = test_app();

    let response = app
        .server
        .post("/login")
        .form(&[("username", "   "), ("password", "creeper")])
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
