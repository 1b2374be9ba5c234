use crate::error::{Error, Result};

const MAX_ALBUM_NAME_LEN: usize = 100;
const MAX_TEXT_LEN: usize = 2000;
const MAX_EMAIL_LEN: usize = 254;

pub fn validate_album_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Album name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_ALBUM_NAME_LEN {
        return Err(Error::Validation(format!(
            "Album name cannot exceed {MAX_ALBUM_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Trims optional free text. Blank input clears the field.
pub fn normalize_text(field: &str, value: Option<String>) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(Error::Validation(format!(
            "{field} cannot exceed {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(Some(value.to_string()))
}

/// Like [`normalize_text`], but a present value must be an http(s) URL.
pub fn normalize_url(field: &str, value: Option<String>) -> Result<Option<String>> {
    let value = normalize_text(field, value)?;
    if let Some(url) = &value {
        if !(url.starts_with("https://") || url.starts_with("http://")) || url.contains(char::is_whitespace) {
            return Err(Error::Validation(format!("{field} must be an http(s) URL")));
        }
    }
    Ok(value)
}

/// Normalizes a contact address to lowercase. Only the shape is checked.
pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(Error::Validation("Email cannot be empty".to_string()));
    }
    if email.len() > MAX_EMAIL_LEN || email.contains(char::is_whitespace) {
        return Err(Error::Validation("Email is not valid".to_string()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(Error::Validation("Email is not valid".to_string())),
    }
}
