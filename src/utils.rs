use sha2::{Digest, Sha256};
use std::time::Duration;

const MAX_STEM_CHARS: usize = 100;

/// Timeout for fetching a page, growing with the length of its URL
pub fn calculate_timeout(base_ms: u64, url_length: usize) -> Duration {
    let additional_ms = (url_length / 20) as u64 * 100;
    Duration::from_millis(base_ms + additional_ms)
}

/// Convert a URL to a sanitized file stem.
///
/// When characters had to be replaced or the stem was cut to length, a short
/// hash of the full URL is appended so that distinct URLs keep distinct files.
pub fn sanitize_filename(url: &str) -> String {
    let stripped = url.replace("http://", "").replace("https://", "");
    let replaced =
        stripped.replace(['/', ':', '?', '&', '=', '#', '%', '\\', '*', '"', '<', '>', '|'], "_");
    let trimmed = replaced.trim_end_matches('_');

    if trimmed.is_empty() {
        return "index".to_string();
    }

    // Limit length on a char boundary
    let name: String = trimmed.chars().take(MAX_STEM_CHARS).collect();
    if name == stripped {
        return name;
    }
    format!("{}_{}", name, short_hash(url))
}

/// First eight hex digits of the SHA-256 of `text`
fn short_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        let name = sanitize_filename("https://site.test/a/b?x=1#top");
        assert!(name.starts_with("site.test_a_b_x_1_top_"), "{name}");
        assert_eq!(name.len(), "site.test_a_b_x_1_top_".len() + 8);
        assert_eq!(sanitize_filename("https://site.test"), "site.test");
        assert_eq!(sanitize_filename("https://"), "index");
        assert_eq!(
            sanitize_filename("https://site.test/a/b"),
            sanitize_filename("https://site.test/a/b")
        );
    }

    #[test]
    fn test_sanitize_filename_keeps_urls_apart() {
        assert_ne!(
            sanitize_filename("https://site.test/a?b"),
            sanitize_filename("https://site.test/a/b")
        );

        let long_a = format!("https://site.test/{}/a", "p".repeat(150));
        let long_b = format!("https://site.test/{}/b", "p".repeat(150));
        let (name_a, name_b) = (sanitize_filename(&long_a), sanitize_filename(&long_b));
        assert_ne!(name_a, name_b);
        assert_eq!(name_a.chars().count(), MAX_STEM_CHARS + 9);

        let wide = sanitize_filename(&format!("https://{}", "é".repeat(150)));
        assert_eq!(wide.chars().count(), MAX_STEM_CHARS + 9);
    }

    #[test]
    fn test_calculate_timeout() {
        assert_eq!(calculate_timeout(1000, 19), Duration::from_millis(1000));
        assert_eq!(calculate_timeout(1000, 45), Duration::from_millis(1200));
    }
}
