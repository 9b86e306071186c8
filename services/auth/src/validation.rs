//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of a user id, in characters
pub const MAX_USER_ID_LEN: usize = 20;
/// Maximum length of a nickname, in characters
pub const MAX_NICKNAME_LEN: usize = 20;
const MAX_PASSWORD_LEN: usize = 128;

/// Validate the length of a user id
pub fn validate_user_id_length(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("ID is required".to_string());
    }

    if id.chars().count() > MAX_USER_ID_LEN {
        return Err(format!(
            "ID must be at most {} characters long",
            MAX_USER_ID_LEN
        ));
    }

    Ok(())
}

/// Validate a user id: ASCII letters and digits, at most 20 characters
pub fn validate_user_id(id: &str) -> Result<(), String> {
    validate_user_id_length(id)?;

    static USER_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USER_ID_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("Failed to compile user id regex"));

    if !regex.is_match(id) {
        return Err("ID can only contain letters and numbers".to_string());
    }

    Ok(())
}

/// Validate nickname
pub fn validate_nickname(nickname: &str) -> Result<(), String> {
    if nickname.trim().is_empty() {
        return Err("Nickname is required".to_string());
    }

    if nickname.chars().count() > MAX_NICKNAME_LEN {
        return Err(format!(
            "Nickname must be at most {} characters long",
            MAX_NICKNAME_LEN
        ));
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() > MAX_PASSWORD_LEN {
        return Err(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_LEN
        ));
    }

    Ok(())
}
