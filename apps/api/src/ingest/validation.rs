//! Upload validation. Runs before anything is stored, so a rejected upload
//! leaves no blob and no Document row behind.

use crate::errors::AppError;

/// Strips media-type parameters (`text/plain; charset=utf-8` → `text/plain`)
/// and lowercases for allow-list comparison.
pub fn normalize_media_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

pub fn validate_upload(
    media_type: &str,
    size: usize,
    allowed: &[String],
    max_bytes: usize,
) -> Result<(), AppError> {
    if !allowed.iter().any(|t| t == media_type) {
        return Err(AppError::Validation(format!(
            "media type '{media_type}' is not supported (allowed: {})",
            allowed.join(", ")
        )));
    }
    if size == 0 {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }
    if size > max_bytes {
        return Err(AppError::Validation(format!(
            "file size {size} bytes exceeds the {max_bytes} byte limit"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 10 * 1024 * 1024;

    fn allowed() -> Vec<String> {
        vec!["application/pdf".to_string(), "text/plain".to_string()]
    }

    #[test]
    fn test_plain_text_within_limit_accepted() {
        assert!(validate_upload("text/plain", 2 * 1024 * 1024, &allowed(), MAX).is_ok());
    }

    #[test]
    fn test_oversize_file_rejected() {
        let err = validate_upload("text/plain", 15 * 1024 * 1024, &allowed(), MAX).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_disallowed_media_type_rejected() {
        let err = validate_upload("application/x-msdownload", 1024, &allowed(), MAX).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_empty_file_rejected() {
        let err = validate_upload("text/plain", 0, &allowed(), MAX).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_exact_limit_accepted() {
        assert!(validate_upload("application/pdf", MAX, &allowed(), MAX).is_ok());
    }

    #[test]
    fn test_normalize_media_type_strips_parameters() {
        assert_eq!(
            normalize_media_type("Text/Plain; charset=UTF-8"),
            "text/plain"
        );
        assert_eq!(normalize_media_type("application/pdf"), "application/pdf");
    }
}
