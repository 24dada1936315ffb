//! Shared data model for the internship platform.
//!
//! These types are the JSON contract between the backend services and any
//! client. The backend stores them in SQLite; nested collections (education,
//! experience, portfolio, preferences) travel as JSON columns.

pub mod application;
pub mod assessment;
pub mod internship;
pub mod profile;
pub mod user;
