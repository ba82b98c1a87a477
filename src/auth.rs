use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{PoisonError, RwLock};

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::task::JoinError;
use uuid::Uuid;

use crate::SharedAppState;
use crate::store::{Store, User};

pub const SESSION_COOKIE: &str = "solder_session";
pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/dashboard";

/// How long a session stays valid after sign-in.
pub const SESSION_LIFETIME_MINUTES: i64 = 120;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    Hash(String),
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Unreadable password hash: {}", e);
            false
        }
    }
}

/// Looks up the user and checks the password.
pub fn authenticate(store: &Store, username: &str, password: &str) -> Option<User> {
    store
        .user_by_username(username)
        .filter(|user| verify_password(password, &user.password_hash))
}

/// Argon2 is CPU-bound, so the check runs on the blocking pool.
pub async fn authenticate_blocking(
    state: SharedAppState,
    username: String,
    password: String,
) -> Result<Option<User>, JoinError> {
    tokio::task::spawn_blocking(move || authenticate(&state.store, &username, &password)).await
}

struct Session {
    user_id: i64,
    issued_at: DateTime<Utc>,
}

/// Opaque session tokens mapped to user ids. Tokens expire after `lifetime`.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    lifetime: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_lifetime(Duration::minutes(SESSION_LIFETIME_MINUTES))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            lifetime,
        }
    }

    pub fn create(&self, user_id: i64) -> String {
        self.issue(user_id, Utc::now())
    }

    fn issue(&self, user_id: i64, issued_at: DateTime<Utc>) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        // Sweep on sign-in so abandoned sessions do not pile up
        sessions.retain(|_, s| now - s.issued_at < self.lifetime);
        sessions.insert(token.clone(), Session { user_id, issued_at });
        token
    }

    /// Resolves a token. Expired tokens are dropped and resolve to `None`.
    pub fn user_id(&self, token: &str) -> Option<i64> {
        let (user_id, issued_at) = {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            let session = sessions.get(token)?;
            (session.user_id, session.issued_at)
        };
        if Utc::now() - issued_at < self.lifetime {
            return Some(user_id);
        }
        tracing::debug!(user_id, "session expired");
        self.revoke(token);
        None
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pulls the session token out of the `Cookie` header(s).
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(token: &str) -> String {
    format!("{}={}; HttpOnly; Path=/; SameSite=Lax", SESSION_COOKIE, token)
}

pub fn expired_session_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Resolves the request's session to a user, if any.
///
/// A token pointing at a user that no longer exists resolves to `None`.
pub fn current_user(state: &SharedAppState, headers: &HeaderMap) -> Option<User> {
    let token = session_token(headers)?;
    let user_id = state.sessions.user_id(&token)?;
    state.store.user(user_id)
}

#[derive(Debug, PartialEq)]
pub enum Access {
    Allow(User),
    Redirect(&'static str),
}

/// Decides whether a request may reach a protected handler.
pub fn gate(user: Option<User>) -> Access {
    match user {
        Some(user) => Access::Allow(user),
        None => Access::Redirect(LOGIN_PATH),
    }
}

/// `302 Found` with a `Location` header.
pub fn redirect(to: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, to)]).into_response()
}

/// The signed-in user, or `None` for guests. Never rejects.
pub struct MaybeUser(pub Option<User>);

#[axum::async_trait]
impl FromRequestParts<SharedAppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedAppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(current_user(state, &parts.headers)))
    }
}

/// The signed-in user. Guests are redirected to the login page.
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<SharedAppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedAppState,
    ) -> Result<Self, Self::Rejection> {
        match gate(current_user(state, &parts.headers)) {
            Access::Allow(user) => Ok(AuthUser(user)),
            Access::Redirect(to) => {
                tracing::debug!("guest request to {} redirected to {}", parts.uri, to);
                Err(redirect(to))
            }
        }
    }
}
