//! Shared test utilities for integration tests.
//!
//! Builds an in-memory app, signs users in without going through the login
//! form, and provides collection assertions for the dashboard payload.

#![allow(dead_code)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::{TestResponse, TestServer};
use chrono::{DateTime, Duration, Utc};
use solder::auth;
use solder::store::User;
use solder::{AppState, SharedAppState, create_app};
use std::sync::Arc;

pub struct TestApp {
    pub server: TestServer,
    pub state: SharedAppState,
}

/// Creates a test server over an empty catalog.
pub fn test_app() -> TestApp {
    let state = Arc::new(AppState::default());
    let server = TestServer::new(create_app(state.clone())).unwrap();
    TestApp { server, state }
}

impl TestApp {
    /// Stores a user whose password is actually hashed, so the login form works.
    pub fn create_user(&self, username: &str, password: &str) -> User {
        let hash = auth::hash_password(password).unwrap();
        self.state.store.create_user(username, hash).unwrap()
    }

    /// Stores a user that can only be signed in through [`TestApp::acting_as`].
    pub fn create_session_user(&self, username: &str) -> User {
        self.state
            .store
            .create_user(username, String::new())
            .unwrap()
    }

    /// Opens a session for `user` and returns the matching `Cookie` header value.
    pub fn acting_as(&self, user: &User) -> HeaderValue {
        let token = self.state.sessions.create(user.id);
        HeaderValue::from_str(&format!("{}={}", auth::SESSION_COOKIE, token)).unwrap()
    }

    pub async fn get_as(&self, path: &str, user: &User) -> TestResponse {
        self.server
            .get(path)
            .add_header(header::COOKIE, self.acting_as(user))
            .await
    }

    /// Dashboard JSON payload as seen by `user`.
    pub async fn dashboard_data(&self, user: &User) -> serde_json::Value {
        let response = self.get_as("/api/dashboard", user).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        response.json()
    }
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

pub fn assert_redirect_to(response: &TestResponse, location: &str) {
    assert_eq!(response.status_code(), StatusCode::FOUND);
    let actual = response
        .headers()
        .get("location")
        .expect("redirect without a location header");
    assert_eq!(actual.to_str().unwrap(), location);
}

/// Ids of the entries under `key` in a dashboard payload, in order.
pub fn ids(data: &serde_json::Value, key: &str) -> Vec<i64> {
    data[key]
        .as_array()
        .unwrap_or_else(|| panic!("`{}` is not a list", key))
        .iter()
        .map(|entry| entry["id"].as_i64().unwrap())
        .collect()
}

pub fn assert_contains(ids: &[i64], id: i64) {
    assert!(
        ids.contains(&id),
        "Failed asserting that the collection {:?} contains {}.",
        ids,
        id
    );
}

pub fn assert_not_contains(ids: &[i64], id: i64) {
    assert!(
        !ids.contains(&id),
        "Failed asserting that the collection {:?} does not contain {}.",
        ids,
        id
    );
}

/// Same length, same ids, same order.
pub fn assert_ids_eq(actual: &[i64], expected: &[i64]) {
    assert_eq!(actual.len(), expected.len(), "collection length differs");
    for (a, b) in actual.iter().zip(expected) {
        assert_eq!(a, b, "expected {:?}, got {:?}", expected, actual);
    }
}
