pub mod dashboard;
pub mod general;
pub mod session;

pub use dashboard::{dashboard, dashboard_data};
pub use general::{health_check, index, not_found, serve_css};
pub use session::{login, login_form, logout};
