use askama::Template;

use crate::dashboard::{BuildEntry, ReleaseEntry};

pub mod filters {
    pub fn format_date(date: &chrono::DateTime<chrono::Utc>) -> askama::Result<String> {
        Ok(date.format("%Y-%m-%d %H:%M").to_string())
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub app_name: String,
    pub page_title: String,
    pub app_version: String,
    pub username: String,
    pub builds: Vec<BuildEntry>,
    pub releases: Vec<ReleaseEntry>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub app_name: String,
    pub page_title: String,
    pub app_version: String,
    pub username: String,
    pub error: Option<String>,
}
