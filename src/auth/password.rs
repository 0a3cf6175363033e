pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const SPECIAL_CHARACTERS: &str = r#"!@#$%^&*(),.?":{}|<>"#;

/// Length is in UTF-16 code units.
#[must_use]
pub fn validate_password(password: &str) -> bool {
    let long_enough = password.encode_utf16().count() >= MIN_PASSWORD_LENGTH;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| SPECIAL_CHARACTERS.contains(c));

    long_enough && has_upper && has_lower && has_digit && has_special
}
