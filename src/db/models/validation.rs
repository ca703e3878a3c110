use validator::ValidationError;

/// Slugs are lowercase ASCII letters, digits, `-` and `_`.
pub fn validate_slug(value: &str) -> Result<(), ValidationError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("slug");
        err.message = Some("Slug may only contain lowercase letters, digits, '-' and '_'".into());
        Err(err)
    }
}
