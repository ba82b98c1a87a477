//! Integration test modules.
//!
//! Each module focuses on a specific feature area.

pub mod auth_tests;
