//! Request payload checks run before any service call.

use super::ApiError;
use crate::domain::money::{MAX_PRICE_CENTS, amount_from_cents, cents_from_amount};
use crate::services::{AttachmentRequest, CategoryRequest, ItemRequest, VaultRequest};

pub const MAX_LOOKAHEAD_DAYS: i64 = 3650;
pub const MAX_LEAD_DAYS: i32 = 3650;
pub const MAX_WARRANTY_MONTHS: i32 = 1200;

pub fn validate_id(kind: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {kind} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Non-blank after trimming, at most `max` characters.
pub fn validate_required<'a>(field: &str, value: &'a str, max: usize) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    validate_len(field, trimmed, max)?;
    Ok(trimmed)
}

pub fn validate_optional(field: &str, value: Option<&str>, max: usize) -> Result<(), ApiError> {
    if let Some(value) = value {
        validate_len(field, value, max)?;
    }
    Ok(())
}

fn validate_len(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::validation(format!(
            "{field} must be {max} characters or less"
        )));
    }
    Ok(())
}

/// Loose shape check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let email = email.trim();
    let valid = email.len() <= 255
        && !email.contains(char::is_whitespace)
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !domain.ends_with('.')
        });

    if !valid {
        return Err(ApiError::validation("Email should be valid"));
    }
    Ok(email)
}

pub fn validate_password(password: &str, min_length: usize) -> Result<&str, ApiError> {
    if password.chars().count() < min_length {
        return Err(ApiError::validation(format!(
            "Password must be at least {min_length} characters"
        )));
    }
    Ok(password)
}

pub fn validate_lookahead_days(days: i64) -> Result<i64, ApiError> {
    if !(1..=MAX_LOOKAHEAD_DAYS).contains(&days) {
        return Err(ApiError::validation(format!(
            "Invalid days: {days}. Days must be between 1 and {MAX_LOOKAHEAD_DAYS}"
        )));
    }
    Ok(days)
}

pub fn validate_lead_days(days: i32) -> Result<i32, ApiError> {
    if !(0..=MAX_LEAD_DAYS).contains(&days) {
        return Err(ApiError::validation(format!(
            "Invalid reminder days: {days}. Must be between 0 and {MAX_LEAD_DAYS}"
        )));
    }
    Ok(days)
}

/// Zero or negative months are accepted and mean "no warranty".
pub fn validate_warranty_months(months: Option<i32>) -> Result<Option<i32>, ApiError> {
    if let Some(m) = months
        && m > MAX_WARRANTY_MONTHS
    {
        return Err(ApiError::validation(format!(
            "Invalid warranty months: {m}. Must be at most {MAX_WARRANTY_MONTHS}"
        )));
    }
    Ok(months)
}

pub fn validate_vault_request(request: &VaultRequest) -> Result<(), ApiError> {
    validate_required("Vault name", &request.name, 100)?;
    validate_optional("Description", request.description.as_deref(), 500)
}

pub fn validate_item_request(request: &ItemRequest) -> Result<(), ApiError> {
    validate_required("Title", &request.title, 200)?;
    validate_optional("Brand", request.brand.as_deref(), 100)?;
    validate_optional("Model", request.model.as_deref(), 100)?;
    validate_optional("Serial number", request.serial_number.as_deref(), 100)?;
    validate_optional("Notes", request.notes.as_deref(), 1000)?;
    validate_warranty_months(request.warranty_months)?;

    if let Some(price) = request.price
        && cents_from_amount(price).is_none()
    {
        return Err(ApiError::validation(format!(
            "Price must be a non-negative amount no greater than {}",
            amount_from_cents(MAX_PRICE_CENTS)
        )));
    }

    Ok(())
}

pub fn validate_category_request(request: &CategoryRequest) -> Result<(), ApiError> {
    validate_required("Category name", &request.name, 50)?;
    validate_optional("Description", request.description.as_deref(), 200)?;
    validate_optional("Icon", request.icon.as_deref(), 50)?;
    if let Some(days) = request.reminder_days_default {
        validate_lead_days(days)?;
    }
    Ok(())
}

pub fn validate_attachment_request(request: &AttachmentRequest) -> Result<(), ApiError> {
    validate_required("File URL", &request.file_url, 2048)?;
    validate_required("File name", &request.file_name, 255)?;
    validate_optional("File type", request.file_type.as_deref(), 100)?;
    if request.file_size.is_some_and(|s| s < 0) {
        return Err(ApiError::validation("File size cannot be negative"));
    }
    Ok(())
}
