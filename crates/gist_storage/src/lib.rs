use sha2::{Digest, Sha256};

pub mod backends;

pub use backends::*;

/// File extension of cached article text.
pub const CACHE_EXTENSION: &str = "txt";

/// Hex digest addressing the cache entry of a URL.
pub fn url_digest(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_digest_is_stable() {
        let a = url_digest("https://example.com/story");
        let b = url_digest("https://example.com/story");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, url_digest("https://example.com/other"));
    }
}
