//! Input rules shared by the HTTP request types.

use validator::ValidationError;

/// Characters accepted as the "special character" of a strong password.
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?`~";

/// Strict password rule: at least one uppercase letter, one lowercase
/// letter, one digit and one special character.
///
/// Length limits are enforced separately by `#[validate(length)]`.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| SPECIAL_CHARS.contains(c));

    if has_upper && has_lower && has_digit && has_special {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_strength");
        err.message = Some(
            "must contain an uppercase letter, a lowercase letter, a digit and a special character"
                .into(),
        );
        Err(err)
    }
}
