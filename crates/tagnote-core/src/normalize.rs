//! Tag normalization.
//!
//! Produces the canonical form of a tag value so that any two Unicode
//! representations of the same visible text map to the same key. Each
//! pipeline stage is independently toggleable through [`NormalizerConfig`].

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Unicode normalization forms supported by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnicodeForm {
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

impl std::fmt::Display for UnicodeForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nfc => write!(f, "NFC"),
            Self::Nfd => write!(f, "NFD"),
            Self::Nfkc => write!(f, "NFKC"),
            Self::Nfkd => write!(f, "NFKD"),
        }
    }
}

impl std::str::FromStr for UnicodeForm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NFC" => Ok(Self::Nfc),
            "NFD" => Ok(Self::Nfd),
            "NFKC" => Ok(Self::Nfkc),
            "NFKD" => Ok(Self::Nfkd),
            _ => Err(format!("Invalid Unicode normalization form: {}", s)),
        }
    }
}

/// Normalizer configuration. Every stage can be switched off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Lowercase the result.
    pub lowercase: bool,
    /// Strip diacritics ("café" → "cafe").
    pub remove_diacritics: bool,
    /// Unicode normalization form, or `None` to skip.
    pub unicode_normalization: Option<UnicodeForm>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_diacritics: true,
            unicode_normalization: Some(UnicodeForm::Nfc),
        }
    }
}

impl NormalizerConfig {
    /// Build a configuration from loosely-typed parts, validating the
    /// normalization form string at construction time.
    ///
    /// `form` of `None` disables Unicode normalization; an unrecognized
    /// form name is a configuration error, raised here rather than at
    /// first use.
    pub fn from_parts(lowercase: bool, remove_diacritics: bool, form: Option<&str>) -> Result<Self> {
        let unicode_normalization = match form {
            Some(name) => Some(name.parse::<UnicodeForm>().map_err(Error::Config)?),
            None => None,
        };
        Ok(Self {
            lowercase,
            remove_diacritics,
            unicode_normalization,
        })
    }
}

/// Deterministic tag normalizer.
///
/// Pipeline order: Unicode normalization form → diacritic stripping →
/// lowercasing. The output is stable under re-normalization.
#[derive(Debug, Clone, Default)]
pub struct TagNormalizer {
    config: NormalizerConfig,
}

impl TagNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize a tag value to its canonical form.
    ///
    /// Empty input yields empty output.
    pub fn normalize(&self, input: &str) -> String {
        if input.is_empty() {
            return String::new();
        }

        // Step 1: Unicode normalization form
        let formed = match self.config.unicode_normalization {
            Some(UnicodeForm::Nfc) => input.nfc().collect::<String>(),
            Some(UnicodeForm::Nfd) => input.nfd().collect::<String>(),
            Some(UnicodeForm::Nfkc) => input.nfkc().collect::<String>(),
            Some(UnicodeForm::Nfkd) => input.nfkd().collect::<String>(),
            None => input.to_string(),
        };

        // Step 2: diacritic stripping. Decomposition first, so precomposed
        // characters lose their marks too.
        let stripped = if self.config.remove_diacritics {
            formed.nfd().filter(|c| !is_combining_mark(*c)).collect()
        } else {
            formed
        };

        // Step 3: case folding
        if self.config.lowercase {
            stripped.to_lowercase()
        } else {
            stripped
        }
    }
}
