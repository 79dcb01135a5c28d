//! Input shape checks applied before signup/login reach the services.
//! These mirror the password policy of the upstream clients: 8 characters
//! minimum with at least one uppercase, one lowercase, one digit and one
//! symbol, and no whitespace.

use rf_core::error::{AppError, Result};

pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric())
        && !password.chars().any(char::is_whitespace)
}

/// Deliberately loose: the mailbox is the only party that can really
/// validate an address. This just rejects obvious garbage.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if !is_strong_password(password) {
        return Err(AppError::Validation(
            "password required: 8 characters minimum, at least 1 uppercase, 1 lowercase, \
             1 digit, 1 special character, no spaces"
                .to_string(),
        ));
    }
    if !is_valid_email(email) {
        return Err(AppError::Validation("invalid email address".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_policy() {
        assert!(is_strong_password("Secret#12"));
        assert!(!is_strong_password("Sh#1abc"));
        assert!(!is_strong_password("alllower#1"));
        assert!(!is_strong_password("ALLUPPER#1"));
        assert!(!is_strong_password("NoDigits#"));
        assert!(!is_strong_password("NoSymbol12"));
        assert!(!is_strong_password("Has Space#1"));
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("ada@example.org"));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("@example.org"));
        assert!(!is_valid_email("ada@"));
        assert!(!is_valid_email("ada@nodot"));
        assert!(!is_valid_email("ada@ex ample.org"));
    }

    #[test]
    fn credentials_report_validation_errors() {
        assert!(validate_credentials("ada@example.org", "Secret#12").is_ok());
        assert!(matches!(
            validate_credentials("ada@example.org", "weak"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_credentials("bad-email", "Secret#12"),
            Err(AppError::Validation(_))
        ));
    }
}
