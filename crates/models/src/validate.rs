use crate::errors::ModelError;

/// Trimmed, non-empty text of at most `max` characters.
pub fn required_text(field: &str, value: &str, max: usize) -> Result<String, ModelError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ModelError::required(field));
    }
    if v.chars().count() > max {
        return Err(ModelError::Validation(format!("{field} must be at most {max} characters")));
    }
    Ok(v.to_string())
}

/// Absolute http(s) url or a server-relative path.
pub fn image_url(field: &str, value: &str) -> Result<String, ModelError> {
    let v = required_text(field, value, 2048)?;
    if v.starts_with("http://") || v.starts_with("https://") || v.starts_with('/') {
        Ok(v)
    } else {
        Err(ModelError::Validation(format!("{field} must be an http(s) url or an absolute path")))
    }
}

pub fn non_negative(field: &str, value: i64) -> Result<(), ModelError> {
    if value < 0 {
        return Err(ModelError::Validation(format!("{field} must not be negative")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_bounds() {
        assert_eq!(required_text("Name", "  Shoes ", 10).unwrap(), "Shoes");
        assert!(required_text("Name", "   ", 10).is_err());
        assert!(required_text("Name", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn image_url_accepts_http_and_paths() {
        assert!(image_url("Image", "https://cdn.example.com/a.png").is_ok());
        assert!(image_url("Image", "/uploads/a.png").is_ok());
        assert!(image_url("Image", "ftp://x/a.png").is_err());
    }

    #[test]
    fn negative_rejected() {
        assert!(non_negative("Price", 0).is_ok());
        assert!(non_negative("Price", -1).is_err());
    }
}
