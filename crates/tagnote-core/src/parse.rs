//! Tag extraction from record content.
//!
//! Content is tokenized on whitespace; each token is validated, normalized,
//! and deduplicated by normalized value while preserving first-occurrence
//! order. Invalid tokens are skipped without surfacing an error — a record
//! body is free text, not a form field.

use std::collections::HashSet;

use tracing::debug;

use crate::normalize::TagNormalizer;
use crate::validate::TagValidator;

/// Parses free-text content into an ordered, deduplicated list of
/// normalized tag values.
#[derive(Debug, Clone, Default)]
pub struct TagParser {
    normalizer: TagNormalizer,
    validator: TagValidator,
}

impl TagParser {
    pub fn new(normalizer: TagNormalizer, validator: TagValidator) -> Self {
        Self {
            normalizer,
            validator,
        }
    }

    /// Extract normalized tag values from content.
    ///
    /// Whitespace-only content yields an empty list. Dedup keeps the
    /// position of the first occurrence:
    /// `"vue react vue"` → `["vue", "react"]`.
    pub fn parse(&self, content: &str) -> Vec<String> {
        if content.trim().is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut tags = Vec::new();

        for token in content.split_whitespace() {
            let validation = self.validator.validate(token);
            if !validation.is_valid {
                debug!(
                    component = "tag_parser",
                    op = "parse",
                    token,
                    errors = ?validation.errors,
                    "Skipping invalid tag token"
                );
                continue;
            }

            let normalized = self.normalizer.normalize(token);
            if normalized.is_empty() {
                continue;
            }
            if seen.insert(normalized.clone()) {
                tags.push(normalized);
            }
        }

        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> TagParser {
        TagParser::default()
    }

    #[test]
    fn test_parse_dedup_preserves_first_occurrence_order() {
        let tags = parser().parse("vue react javascript vue nodejs react");
        assert_eq!(tags, vec!["vue", "react", "javascript", "nodejs"]);
    }

    #[test]
    fn test_parse_skips_invalid_tokens_silently() {
        let tags = parser().parse("valid-tag invalid{}tag another-valid");
        assert_eq!(tags, vec!["valid-tag", "another-valid"]);
    }

    #[test]
    fn test_parse_empty_and_whitespace_content() {
        assert!(parser().parse("").is_empty());
        assert!(parser().parse("   \t\n  ").is_empty());
    }

    #[test]
    fn test_parse_normalizes_tokens() {
        let tags = parser().parse("Café RUST");
        assert_eq!(tags, vec!["cafe", "rust"]);
    }

    #[test]
    fn test_parse_dedups_by_normalized_value() {
        // Distinct surface forms, same canonical value
        let tags = parser().parse("Rust rust RUST café cafe");
        assert_eq!(tags, vec!["rust", "cafe"]);
    }

    #[test]
    fn test_parse_splits_on_whitespace_runs() {
        let tags = parser().parse("one\t\ttwo\n three");
        assert_eq!(tags, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_parse_all_invalid_yields_empty() {
        let tags = parser().parse("a,b [x] {y} \"quoted\"");
        assert!(tags.is_empty());
    }
}
