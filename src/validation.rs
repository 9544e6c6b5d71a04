// Validation utilities module
// Custom validation functions used by the request DTO derives

use validator::ValidationError;

/// Validates password strength: at least 8 characters with at least one
/// lowercase letter, one uppercase letter, and one digit
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(ValidationError::new("password_too_short"));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::new("password_missing_lowercase"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::new("password_missing_uppercase"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("password_missing_digit"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_accepted() {
        assert!(validate_password_strength("Str0ngpass").is_ok());
    }

    #[test]
    fn test_short_password_rejected() {
        let err = validate_password_strength("Ab1").unwrap_err();
        assert_eq!(err.code, "password_too_short");
    }

    #[test]
    fn test_password_without_digit_rejected() {
        let err = validate_password_strength("Nodigitshere").unwrap_err();
        assert_eq!(err.code, "password_missing_digit");
    }

    #[test]
    fn test_password_without_uppercase_rejected() {
        let err = validate_password_strength("alllower1").unwrap_err();
        assert_eq!(err.code, "password_missing_uppercase");
    }

    #[test]
    fn test_password_without_lowercase_rejected() {
        let err = validate_password_strength("ALLUPPER1").unwrap_err();
        assert_eq!(err.code, "password_missing_lowercase");
    }
}
