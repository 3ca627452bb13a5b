use crate::api::error::AppError;

/// Maximum attachment size: 5 MiB
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Allowed attachment MIME types
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "application/pdf"];

/// Validates the declared content type against the allowlist.
///
/// Returns the normalized type (parameters stripped, lowercased). The
/// declared type is trusted — no content sniffing happens anywhere.
pub fn validate_mime_type(content_type: &str) -> Result<String, AppError> {
    let parsed: mime::Mime = content_type.trim().parse().map_err(|_| {
        AppError::InvalidFileType(format!("Unrecognized content type '{}'", content_type))
    })?;

    let normalized = parsed.essence_str().to_ascii_lowercase();
    if ALLOWED_MIME_TYPES.contains(&normalized.as_str()) {
        return Ok(normalized);
    }

    Err(AppError::InvalidFileType(format!(
        "File type '{}' is not allowed. Only JPG, PNG and PDF are accepted.",
        content_type
    )))
}

/// Validates the declared file size against the ceiling (inclusive).
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), AppError> {
    if size > max_size {
        return Err(AppError::FileTooLarge(format!(
            "File size {} bytes exceeds the maximum of {} bytes ({} MB)",
            size,
            max_size,
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Requires a non-empty name after trimming; returns the trimmed value.
pub fn validate_patient_name(name: Option<&str>) -> Result<String, AppError> {
    let trimmed = name.unwrap_or("").trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mime_type() {
        assert_eq!(validate_mime_type("image/jpeg").unwrap(), "image/jpeg");
        assert_eq!(validate_mime_type("image/png").unwrap(), "image/png");
        assert_eq!(
            validate_mime_type("application/pdf").unwrap(),
            "application/pdf"
        );

        // Parameters are ignored when matching
        assert_eq!(
            validate_mime_type("image/png; charset=binary").unwrap(),
            "image/png"
        );
        assert_eq!(validate_mime_type("IMAGE/JPEG").unwrap(), "image/jpeg");

        assert!(matches!(
            validate_mime_type("text/plain"),
            Err(AppError::InvalidFileType(_))
        ));
        assert!(matches!(
            validate_mime_type("image/gif"),
            Err(AppError::InvalidFileType(_))
        ));
        assert!(matches!(
            validate_mime_type(""),
            Err(AppError::InvalidFileType(_))
        ));
    }

    #[test]
    fn test_validate_file_size() {
        assert!(validate_file_size(0, MAX_FILE_SIZE).is_ok());
        assert!(validate_file_size(1024, MAX_FILE_SIZE).is_ok());
        // The ceiling itself is accepted, one byte over is not
        assert!(validate_file_size(MAX_FILE_SIZE, MAX_FILE_SIZE).is_ok());
        assert!(matches!(
            validate_file_size(MAX_FILE_SIZE + 1, MAX_FILE_SIZE),
            Err(AppError::FileTooLarge(_))
        ));
    }

    #[test]
    fn test_validate_patient_name() {
        assert_eq!(validate_patient_name(Some("Ana Silva")).unwrap(), "Ana Silva");
        assert_eq!(validate_patient_name(Some("  Ana  ")).unwrap(), "Ana");

        assert!(matches!(
            validate_patient_name(Some("")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_patient_name(Some("   ")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_patient_name(None),
            Err(AppError::Validation(_))
        ));
    }
}
