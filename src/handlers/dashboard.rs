use axum::{Json, extract::State};

use crate::auth::AuthUser;
use crate::dashboard::Dashboard;
use crate::templates::*;

pub async fn dashboard(
    State(state): State<crate::SharedAppState>,
    AuthUser(user): AuthUser,
) -> DashboardTemplate {
    let Dashboard { builds, releases } = Dashboard::assemble(&state.store);
    tracing::debug!(
        user = %user.username,
        builds = builds.len(),
        releases = releases.len(),
        "rendering dashboard"
    );

    DashboardTemplate {
        app_name: state.app_name.clone(),
        page_title: "Dashboard".to_string(),
        app_version: state.app_version.clone(),
        username: user.username,
        builds,
        releases,
    }
}

pub async fn dashboard_data(
    State(state): State<crate::SharedAppState>,
    AuthUser(_user): AuthUser,
) -> Json<Dashboard> {
    Json(Dashboard::assemble(&state.store))
}
