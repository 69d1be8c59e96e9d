//! Small helpers for URL handling, log formatting and file system checks.

use crate::error::ScrapeError;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Truncate a string for logging purposes.
///
/// Cuts on a character boundary so that non-ASCII payloads (Arabic sites)
/// never panic, and appends the number of dropped bytes.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Rewrite a plain `http://` URL to `https://`. Other schemes pass through.
pub fn prefer_https(raw: &str) -> String {
    match raw.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => raw.to_string(),
    }
}

/// Resolve `raw` against `base`, the way a browser resolves an `href`.
pub fn absolute_url(base: &str, raw: &str) -> Result<String, ScrapeError> {
    let base_url = Url::parse(base).map_err(|source| ScrapeError::Url {
        url: base.to_string(),
        source,
    })?;
    base_url
        .join(raw.trim())
        .map(|u| u.to_string())
        .map_err(|source| ScrapeError::Url {
            url: raw.to_string(),
            source,
        })
}

/// Resolve an image reference: blank stays absent, `http` becomes `https`.
pub fn absolute_image_url(base: &str, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    absolute_url(base, &prefer_https(raw)).ok()
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Store directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        // Each Arabic letter is two bytes; 3 is not a boundary.
        let result = truncate_for_log("سياسة", 3);
        assert!(result.starts_with("س"));
        assert!(result.contains("bytes)"));
    }

    #[test]
    fn test_prefer_https() {
        assert_eq!(prefer_https("http://img.example.com/a.jpg"), "https://img.example.com/a.jpg");
        assert_eq!(prefer_https("https://img.example.com/a.jpg"), "https://img.example.com/a.jpg");
        assert_eq!(prefer_https("/a.jpg"), "/a.jpg");
    }

    #[test]
    fn test_absolute_url_joins_relative_paths() {
        assert_eq!(
            absolute_url("https://www.youm7.com", "/story/2026/10/19/a").unwrap(),
            "https://www.youm7.com/story/2026/10/19/a"
        );
        assert_eq!(
            absolute_url("https://www.youm7.com", "https://other.com/x").unwrap(),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_absolute_image_url() {
        assert_eq!(absolute_image_url("https://a.com", "   "), None);
        assert_eq!(
            absolute_image_url("https://a.com", "http://cdn.a.com/i.png"),
            Some("https://cdn.a.com/i.png".to_string())
        );
        assert_eq!(
            absolute_image_url("https://a.com", "/i.png"),
            Some("https://a.com/i.png".to_string())
        );
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("store/nested");
        ensure_writable_dir(nested.to_str().unwrap()).await.unwrap();
        assert!(nested.is_dir());
    }
}
