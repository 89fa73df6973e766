use crate::errors::AppError;

/// Text extraction seam. Extraction engines are a deployment concern; the
/// pipeline only needs plain text back.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], media_type: &str) -> Result<String, AppError>;
}

/// Built-in extractor covering PDF and plain text. The ingestion allow-list
/// defaults to exactly the types this handles.
pub struct BundledExtractor;

impl TextExtractor for BundledExtractor {
    fn extract(&self, bytes: &[u8], media_type: &str) -> Result<String, AppError> {
        if media_type == "application/pdf" || bytes.starts_with(b"%PDF") {
            return pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
                AppError::UnprocessableEntity(format!("failed to extract text from PDF: {e}"))
            });
        }
        if media_type.starts_with("text/") {
            return Ok(String::from_utf8_lossy(bytes).into_owned());
        }
        Err(AppError::UnprocessableEntity(format!(
            "no text extractor available for media type '{media_type}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        let text = BundledExtractor
            .extract(b"10 years of Rust experience", "text/plain")
            .unwrap();
        assert_eq!(text, "10 years of Rust experience");
    }

    #[test]
    fn test_invalid_utf8_is_lossy_not_fatal() {
        let text = BundledExtractor
            .extract(&[0x52, 0x75, 0x73, 0x74, 0xFF], "text/plain")
            .unwrap();
        assert!(text.starts_with("Rust"));
    }

    #[test]
    fn test_unknown_media_type_is_unprocessable() {
        let err = BundledExtractor
            .extract(b"PK\x03\x04", "application/zip")
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[test]
    fn test_pdf_magic_bytes_route_to_pdf_extraction() {
        // Not a real PDF, so extraction fails, but it must be routed to the
        // PDF path rather than treated as text.
        let err = BundledExtractor
            .extract(b"%PDF-1.7 garbage", "application/octet-stream")
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }
}
