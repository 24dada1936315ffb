pub mod admin;
pub mod applications;
pub mod auth;
pub mod internships;
pub mod recruiters;
pub mod students;
