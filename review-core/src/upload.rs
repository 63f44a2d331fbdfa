use chrono::{DateTime, Utc};

pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Directory below the static root that holds uploaded entry images.
pub const UPLOAD_DIR: &str = "uploads";

/// Lowercased extension of `filename` if it names an allowed image type.
pub fn image_extension(filename: &str) -> Option<String> {
    let (_, extension) = filename.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    ALLOWED_IMAGE_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

pub fn is_allowed_image(filename: &str) -> bool {
    image_extension(filename).is_some()
}

/// Reduces a client supplied filename to a flat ASCII name that is safe to
/// join onto a storage directory.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Name an uploaded image is stored under: upload time, a caller supplied
/// nonce and the sanitized original name. Returns `None` for disallowed types.
pub fn stored_image_name(
    original: &str,
    uploaded_at: DateTime<Utc>,
    nonce: &str,
) -> Option<String> {
    let extension = image_extension(original)?;
    let mut name = secure_filename(original);
    if !name
        .to_ascii_lowercase()
        .ends_with(&format!(".{}", extension))
    {
        name = format!("image.{}", extension);
    }
    Some(format!(
        "{}_{}_{}",
        uploaded_at.timestamp_micros(),
        nonce,
        name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(is_allowed_image("cover.png"));
        assert!(is_allowed_image("cover.JPeG"));
        assert!(is_allowed_image("my.holiday.gif"));
        assert!(!is_allowed_image("cover.exe"));
        assert!(!is_allowed_image("cover.png.exe"));
        assert!(!is_allowed_image("png"));
        assert!(!is_allowed_image(""));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My cover.png"), "My_cover.png");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("C:\\temp\\shot.jpg"), "C_temp_shot.jpg");
        assert_eq!(secure_filename("\u{5c01}\u{9762}.png"), "png");
    }

    #[test]
    fn test_stored_image_name() {
        let now = Utc::now();
        let name = stored_image_name("cover.png", now, "abc").unwrap();
        assert_eq!(name, format!("{}_abc_cover.png", now.timestamp_micros()));

        let fallback = stored_image_name("\u{5c01}\u{9762}.PNG", now, "abc").unwrap();
        assert!(fallback.ends_with("_abc_image.png"));

        assert_eq!(stored_image_name("cover.exe", now, "abc"), None);
    }

    #[test]
    fn test_identical_uploads_get_distinct_names() {
        let now = Utc::now();
        let first = stored_image_name("cover.png", now, "n1").unwrap();
        let second = stored_image_name("cover.png", now, "n2").unwrap();
        assert_ne!(first, second);
    }
}
