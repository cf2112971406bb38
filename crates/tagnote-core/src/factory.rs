//! Tag construction.
//!
//! The factory is the only way to mint a new [`Tag`]: normalize the raw
//! value, validate the *normalized* result, then assign a fresh identity.
//! Validating after normalization catches anything normalization could
//! surface (a compatibility form expanding into whitespace, for example).

use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Tag;
use crate::normalize::TagNormalizer;
use crate::validate::TagValidator;

/// Creates tags with normalized values and fresh UUIDv7 identities.
#[derive(Debug, Clone, Default)]
pub struct TagFactory {
    normalizer: TagNormalizer,
    validator: TagValidator,
}

impl TagFactory {
    pub fn new(normalizer: TagNormalizer, validator: TagValidator) -> Self {
        Self {
            normalizer,
            validator,
        }
    }

    pub fn normalizer(&self) -> &TagNormalizer {
        &self.normalizer
    }

    /// Create a tag from a raw value.
    ///
    /// Fails with `TAG_CREATION_ERROR` if the normalized value is empty,
    /// too long, or contains whitespace or forbidden characters.
    pub fn create_from_string(&self, raw: &str) -> Result<Tag> {
        let normalized = self.normalizer.normalize(raw);

        let validation = self.validator.validate(&normalized);
        if !validation.is_valid {
            return Err(Error::TagCreation(validation.errors.join("; ")));
        }

        Ok(Tag::from_parts(Uuid::now_v7(), normalized, Utc::now()))
    }
}
