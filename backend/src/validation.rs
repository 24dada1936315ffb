//! Field-level input validation.
//!
//! Each validator collects every failing field before returning, so a 400
//! response carries the full list of problems rather than the first one.

use std::sync::OnceLock;

use common::requests::{CreateInternshipRequest, RegisterRequest, UpdateInternshipRequest};
use regex::Regex;

use crate::error::{ApiError, FieldError};

fn username_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{3,30}$").expect("username regex"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex")
    })
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_password(password: &str, errors: &mut Vec<FieldError>) {
    if password.len() < 6 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters long",
        ));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one lowercase letter, one uppercase letter, and one number",
        ));
    }
}

pub fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if !username_re().is_match(req.username.trim()) {
        errors.push(FieldError::new(
            "username",
            "Username must be 3-30 characters of letters, numbers, and underscores",
        ));
    }
    if !email_re().is_match(&normalize_email(&req.email)) {
        errors.push(FieldError::new(
            "email",
            "Please provide a valid email address",
        ));
    }
    check_password(&req.password, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub fn validate_new_password(password: &str) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    check_password(password, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub fn validate_internship(req: &CreateInternshipRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if req.title.trim().is_empty() {
        errors.push(FieldError::new("title", "Internship title is required"));
    } else if req.title.len() > 100 {
        errors.push(FieldError::new(
            "title",
            "Title must be less than 100 characters",
        ));
    }
    if req.company.trim().is_empty() {
        errors.push(FieldError::new("company", "Company name is required"));
    }
    if req.description.trim().is_empty() {
        errors.push(FieldError::new("description", "Description is required"));
    } else if req.description.len() > 2000 {
        errors.push(FieldError::new(
            "description",
            "Description must be less than 2000 characters",
        ));
    }
    if req.location.trim().is_empty() {
        errors.push(FieldError::new("location", "Location is required"));
    }
    if req.duration.trim().is_empty() {
        errors.push(FieldError::new("duration", "Duration is required"));
    }
    if req.industry.trim().is_empty() {
        errors.push(FieldError::new("industry", "Industry is required"));
    }
    if req.openings < 1 {
        errors.push(FieldError::new("openings", "Openings must be at least 1"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// The update path checks only the fields the request actually carries,
/// against the same limits the create path enforces.
pub fn validate_internship_update(req: &UpdateInternshipRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if let Some(title) = &req.title {
        if title.trim().is_empty() {
            errors.push(FieldError::new("title", "Internship title is required"));
        } else if title.len() > 100 {
            errors.push(FieldError::new(
                "title",
                "Title must be less than 100 characters",
            ));
        }
    }
    if let Some(company) = &req.company {
        if company.trim().is_empty() {
            errors.push(FieldError::new("company", "Company name is required"));
        }
    }
    if let Some(description) = &req.description {
        if description.trim().is_empty() {
            errors.push(FieldError::new("description", "Description is required"));
        } else if description.len() > 2000 {
            errors.push(FieldError::new(
                "description",
                "Description must be less than 2000 characters",
            ));
        }
    }
    if let Some(location) = &req.location {
        if location.trim().is_empty() {
            errors.push(FieldError::new("location", "Location is required"));
        }
    }
    if let Some(duration) = &req.duration {
        if duration.trim().is_empty() {
            errors.push(FieldError::new("duration", "Duration is required"));
        }
    }
    if let Some(industry) = &req.industry {
        if industry.trim().is_empty() {
            errors.push(FieldError::new("industry", "Industry is required"));
        }
    }
    if let Some(openings) = req.openings {
        if openings < 1 {
            errors.push(FieldError::new("openings", "Openings must be at least 1"));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub fn validate_cover_letter(cover_letter: Option<&str>) -> Result<(), ApiError> {
    if let Some(text) = cover_letter {
        if text.len() > 1000 {
            return Err(ApiError::Validation(vec![FieldError::new(
                "cover_letter",
                "Cover letter must be less than 1000 characters",
            )]));
        }
    }
    Ok(())
}

pub fn validate_rating(rating: u8) -> Result<(), ApiError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(ApiError::Validation(vec![FieldError::new(
            "rating",
            "Rating must be between 1 and 5",
        )]))
    }
}

pub fn validate_bio(bio: Option<&str>) -> Result<(), ApiError> {
    if let Some(text) = bio {
        if text.len() > 500 {
            return Err(ApiError::Validation(vec![FieldError::new(
                "bio",
                "Bio must be less than 500 characters",
            )]));
        }
    }
    Ok(())
}
