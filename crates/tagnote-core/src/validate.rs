//! Tag validation.
//!
//! Validation aggregates every violation instead of stopping at the first,
//! so callers can report the full rule set back to the user. Only the
//! empty-input case short-circuits.

use serde::{Deserialize, Serialize};

/// Maximum tag length in characters (not bytes).
pub const MAX_TAG_LENGTH: usize = 100;

/// Characters that can never appear in a tag value.
///
/// These collide with the serialized forms tags travel in (JSON arrays,
/// `key:value` filters, quoted lists).
pub const FORBIDDEN_CHARS: [char; 8] = ['{', '}', '[', ']', ':', ',', '"', '\\'];

/// Outcome of validating a single tag value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// The value that was examined.
    pub tag: String,
}

impl TagValidation {
    fn valid(tag: &str) -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            tag: tag.to_string(),
        }
    }

    fn invalid(tag: &str, errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            tag: tag.to_string(),
        }
    }
}

/// Validates tag values against the fixed rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagValidator;

impl TagValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a tag value, collecting every violated rule.
    ///
    /// Rules:
    /// - non-empty (short-circuits; no other rule is reported for `""`)
    /// - at most [`MAX_TAG_LENGTH`] characters
    /// - no Unicode whitespace
    /// - none of [`FORBIDDEN_CHARS`], one error per distinct offender
    pub fn validate(&self, tag: &str) -> TagValidation {
        if tag.is_empty() {
            return TagValidation::invalid(tag, vec!["Tag cannot be empty".to_string()]);
        }

        let mut errors = Vec::new();

        let char_count = tag.chars().count();
        if char_count > MAX_TAG_LENGTH {
            errors.push(format!(
                "Tag must be {} characters or less (got {})",
                MAX_TAG_LENGTH, char_count
            ));
        }

        if tag.chars().any(char::is_whitespace) {
            errors.push("Tag cannot contain whitespace".to_string());
        }

        for forbidden in FORBIDDEN_CHARS {
            if tag.contains(forbidden) {
                errors.push(format!("Tag cannot contain '{}'", forbidden));
            }
        }

        if errors.is_empty() {
            TagValidation::valid(tag)
        } else {
            TagValidation::invalid(tag, errors)
        }
    }

    /// Convenience check when the rule breakdown is not needed.
    pub fn is_valid(&self, tag: &str) -> bool {
        self.validate(tag).is_valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tags() {
        let v = TagValidator::new();
        for tag in [
            "rust",
            "multi-word-tag",
            "snake_case",
            "c++",
            "c#",
            "v1.2.3",
            "@mention",
            "(parens)",
            "日本語",
            "тег",
        ] {
            let result = v.validate(tag);
            assert!(result.is_valid, "{tag:?} should be valid: {:?}", result.errors);
            assert!(result.errors.is_empty());
        }
    }

    #[test]
    fn test_empty_tag_single_error_short_circuit() {
        let v = TagValidator::new();
        let result = v.validate("");
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("empty"));
    }

    #[test]
    fn test_too_long_tag() {
        let v = TagValidator::new();
        let tag = "a".repeat(MAX_TAG_LENGTH + 1);
        let result = v.validate(&tag);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_length_counted_in_chars_not_bytes() {
        let v = TagValidator::new();
        // 100 three-byte chars: 300 bytes but exactly at the char limit
        let tag = "語".repeat(MAX_TAG_LENGTH);
        assert!(v.validate(&tag).is_valid);
        assert!(!v.validate(&format!("{}語", tag)).is_valid);
    }

    #[test]
    fn test_whitespace_rejected() {
        let v = TagValidator::new();
        for tag in ["two words", "tab\there", "line\nbreak", "nbsp\u{00a0}here"] {
            let result = v.validate(tag);
            assert!(!result.is_valid, "{tag:?} should be invalid");
            assert!(result.errors.iter().any(|e| e.contains("whitespace")));
        }
    }

    #[test]
    fn test_forbidden_chars_one_error_each() {
        let v = TagValidator::new();
        let result = v.validate("bad{tag}");
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);

        // Repeats of the same forbidden char report once
        let result = v.validate("a::b");
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_multi_error_aggregation() {
        let v = TagValidator::new();
        // Too long + whitespace + two distinct forbidden chars
        let tag = format!("{} {}[]", "a".repeat(MAX_TAG_LENGTH), "b");
        let result = v.validate(&tag);
        assert!(!result.is_valid);
        assert!(result.errors.len() >= 4, "errors: {:?}", result.errors);
    }

    #[test]
    fn test_validation_carries_examined_tag() {
        let v = TagValidator::new();
        assert_eq!(v.validate("ok-tag").tag, "ok-tag");
        assert_eq!(v.validate("").tag, "");
    }
}
