//! Request-shape validation.
//!
//! Rejects malformed input before it reaches the engine; the engine still
//! enforces its own invariants, so these checks only exist to give clients
//! precise 422s instead of opaque errors.

use crate::ServerError;

pub fn email(value: &str) -> Result<(), ServerError> {
    let value = value.trim();
    if value.is_empty() || value.len() > 255 {
        return Err(ServerError::Validation(
            "email must be between 1 and 255 characters".to_string(),
        ));
    }
    let Some((local, domain)) = value.split_once('@') else {
        return Err(ServerError::Validation(
            "email must contain a single @".to_string(),
        ));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(ServerError::Validation("invalid email address".to_string()));
    }
    Ok(())
}

pub fn password(value: &str) -> Result<(), ServerError> {
    if value.chars().count() < 6 {
        return Err(ServerError::Validation(
            "password must be at least 6 characters".to_string(),
        ));
    }
    if value.len() > 255 {
        return Err(ServerError::Validation(
            "password must be at most 255 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn name(value: &str) -> Result<(), ServerError> {
    let count = value.trim().chars().count();
    if count == 0 {
        return Err(ServerError::Validation(
            "name must not be empty".to_string(),
        ));
    }
    if count > 50 {
        return Err(ServerError::Validation(
            "name must be at most 50 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn status_content(value: &str) -> Result<(), ServerError> {
    let count = value.trim().chars().count();
    if count == 0 {
        return Err(ServerError::Validation(
            "content must not be empty".to_string(),
        ));
    }
    if count > 140 {
        return Err(ServerError::Validation(
            "content must be at most 140 characters".to_string(),
        ));
    }
    Ok(())
}
