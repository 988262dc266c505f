use crate::Result;

/// Converts an HTML document into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<String>;
}
