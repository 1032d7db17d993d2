//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates an in-game player tag: a `#` followed by 3 to 12 uppercase
/// alphanumeric characters.
///
/// # Examples
///
/// ```ignore
/// validate_player_tag("#2PP0JYLQ") // Ok
/// validate_player_tag("2PP0JYLQ")  // Err - missing '#'
/// validate_player_tag("#2pp0jylq") // Err - lowercase
/// ```
pub fn validate_player_tag(tag: &str) -> Result<(), ValidationError> {
    let Some(body) = tag.strip_prefix('#') else {
        let mut err = ValidationError::new("player_tag_prefix");
        err.message = Some("Player tag must start with '#'".into());
        return Err(err);
    };

    if !(3..=12).contains(&body.len()) {
        let mut err = ValidationError::new("player_tag_length");
        err.message = Some(
            format!(
                "Player tag must be 3-12 characters after '#' (got {})",
                body.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    {
        let mut err = ValidationError::new("player_tag_format");
        err.message =
            Some("Player tag must contain only digits and uppercase letters after '#'".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a cup slug: 1 to 32 lowercase alphanumeric characters or dashes,
/// never starting or ending with a dash.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() || slug.len() > 32 {
        let mut err = ValidationError::new("slug_length");
        err.message = Some(format!("Slug must be 1-32 characters (got {})", slug.len()).into());
        return Err(err);
    }

    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid_chars || slug.starts_with('-') || slug.ends_with('-') {
        let mut err = ValidationError::new("slug_format");
        err.message = Some(
            "Slug must contain only lowercase letters, digits and inner dashes".into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_tag_valid() {
        assert!(validate_player_tag("#2PP0JYLQ").is_ok());
        assert!(validate_player_tag("#ABC").is_ok());
        assert!(validate_player_tag("#000000000000").is_ok());
    }

    #[test]
    fn test_validate_player_tag_invalid() {
        assert!(validate_player_tag("2PP0JYLQ").is_err()); // missing prefix
        assert!(validate_player_tag("#ab").is_err()); // too short
        assert!(validate_player_tag("#2pp0jylq").is_err()); // lowercase
        assert!(validate_player_tag("#2PP 0JYL").is_err()); // space
        assert!(validate_player_tag("#2PP0JYLQ2PP0J").is_err()); // too long
    }

    #[test]
    fn test_validate_slug_valid() {
        assert!(validate_slug("buc-cup").is_ok());
        assert!(validate_slug("bsn2026").is_ok());
        assert!(validate_slug("x").is_ok());
    }

    #[test]
    fn test_validate_slug_invalid() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug("BUC-Cup").is_err()); // uppercase
        assert!(validate_slug("-cup").is_err()); // leading dash
        assert!(validate_slug("cup-").is_err()); // trailing dash
        assert!(validate_slug("a b").is_err()); // space
    }
}
