//! Upload acceptance checks

use crate::error::{MediaError, Result};
use crate::naming::extension;

/// Accepted image kinds, matched against both extension and MIME subtype
pub const ALLOWED_TYPES: &[&str] = &["jpeg", "jpg", "png", "gif", "webp", "avif", "svg"];

/// Accept an upload by name, declared MIME type and size
pub fn validate_upload(original_name: &str, content_type: &str, size: usize, max_size: usize) -> Result<()> {
    if size > max_size {
        return Err(MediaError::TooLarge {
            max_mb: max_size / (1024 * 1024),
        });
    }

    let ext_ok = extension(original_name).is_some_and(|e| ALLOWED_TYPES.contains(&e.as_str()));
    if !ext_ok || !mime_allowed(content_type) {
        return Err(MediaError::UnsupportedType);
    }
    Ok(())
}

/// `image/<subtype>[+suffix][; params]` with an allowed subtype
fn mime_allowed(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence
        .strip_prefix("image/")
        .map(|subtype| subtype.split('+').next().unwrap_or_default())
        .is_some_and(|subtype| ALLOWED_TYPES.contains(&subtype))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 10 * 1024 * 1024;

    #[test]
    fn test_accepts_allowed_types() {
        assert!(validate_upload("a.jpg", "image/jpeg", 10, MAX).is_ok());
        assert!(validate_upload("a.PNG", "image/png", 10, MAX).is_ok());
        assert!(validate_upload("logo.svg", "image/svg+xml", 10, MAX).is_ok());
        assert!(validate_upload("a.avif", "image/avif; charset=binary", 10, MAX).is_ok());
    }

    #[test]
    fn test_rejects_mismatched_extension_or_mime() {
        assert!(matches!(
            validate_upload("a.exe", "image/png", 10, MAX),
            Err(MediaError::UnsupportedType)
        ));
        assert!(matches!(
            validate_upload("a.png", "application/octet-stream", 10, MAX),
            Err(MediaError::UnsupportedType)
        ));
        assert!(matches!(
            validate_upload("noext", "image/png", 10, MAX),
            Err(MediaError::UnsupportedType)
        ));
    }

    #[test]
    fn test_rejects_oversize() {
        let err = validate_upload("a.png", "image/png", MAX + 1, MAX).unwrap_err();
        assert_eq!(err.to_string(), "File is too large. Maximum size is 10 MB");
    }
}
