// Validation utilities module
// Custom validators for backend identifiers sent in request payloads

use validator::ValidationError;

/// Validates an RBAC code such as `STUDENT_CREATE` or `GUEST_LECTURER`
/// Uppercase ASCII letters, digits and underscores, starting with a letter
pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    let mut chars = code.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_uppercase());
    let rest_ok = chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');

    if starts_with_letter && rest_ok {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_code"))
    }
}

/// Validates a dynamic profile field key such as `university_name`
/// Lowercase ASCII letters, digits and underscores, starting with a letter
pub fn validate_field_key(name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if starts_with_letter && rest_ok {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_field_key"))
    }
}

/// Validates that a backend primary key is positive
pub fn validate_id(id: i64) -> Result<(), ValidationError> {
    if id <= 0 {
        Err(ValidationError::new("id_must_be_positive"))
    } else {
        Ok(())
    }
}

/// Validates every id in a list of backend primary keys
pub fn validate_ids(ids: &[i64]) -> Result<(), ValidationError> {
    ids.iter().try_for_each(|id| validate_id(*id))
}
