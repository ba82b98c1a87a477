use axum::{
    Form,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::auth::{self, MaybeUser};
use crate::templates::*;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn login_page(state: &crate::AppState, username: String, error: Option<String>) -> LoginTemplate {
    LoginTemplate {
        app_name: state.app_name.clone(),
        page_title: "Sign in".to_string(),
        app_version: state.app_version.clone(),
        username,
        error,
    }
}

pub async fn login_form(
    State(state): State<crate::SharedAppState>,
    MaybeUser(user): MaybeUser,
) -> Response {
    if user.is_some() {
        return auth::redirect(auth::HOME_PATH);
    }
    login_page(&state, String::new(), None).into_response()
}

pub async fn login(
    State(state): State<crate::SharedAppState>,
    Form(credentials): Form<Credentials>,
) -> crate::AppResult<Response> {
    let username = credentials.username.trim();
    if username.is_empty() {
        return Err(crate::AppError::BadRequest("Username is required".to_string()));
    }

    let candidate = auth::authenticate_blocking(
        state.clone(),
        username.to_string(),
        credentials.password,
    )
    .await?;
    let Some(user) = candidate else {
        tracing::warn!(username, "login failed");
        let page = login_page(
            &state,
            username.to_string(),
            Some("These credentials do not match our records.".to_string()),
        );
        return Ok((StatusCode::UNAUTHORIZED, page).into_response());
    };

    let token = state.sessions.create(user.id);
    tracing::info!(username = %user.username, "login succeeded");

    let mut response = auth::redirect(auth::HOME_PATH);
    if let Ok(cookie) = auth::session_cookie(&token).parse::<HeaderValue>() {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

pub async fn logout(State(state): State<crate::SharedAppState>, headers: HeaderMap) -> Response {
    if let Some(token) = auth::session_token(&headers)
        && state.sessions.revoke(&token)
    {
        tracing::info!("logout");
    }

    let mut response = auth::redirect(auth::LOGIN_PATH);
    if let Ok(cookie) = auth::expired_session_cookie().parse::<HeaderValue>() {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}
