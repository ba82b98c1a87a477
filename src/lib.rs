pub mod app;
pub mod auth;
pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod recent;
pub mod store;
pub mod templates;

pub use app::{AppState, SharedAppState, create_app};
pub use error::{AppError, AppResult};
