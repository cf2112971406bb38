//! # tagnote-core
//!
//! Core types, tag pipeline, and port traits for the tagnote library.
//!
//! This crate provides the domain entities, the tag
//! normalization/validation/parsing pipeline, duplicate and match
//! semantics, and the repository/unit-of-work traits other tagnote crates
//! depend on.

pub mod duplicate;
pub mod error;
pub mod export;
pub mod factory;
pub mod logging;
pub mod matching;
pub mod models;
pub mod normalize;
pub mod parse;
pub mod traits;
pub mod validate;

// Re-export commonly used types at crate root
pub use duplicate::DuplicateChecker;
pub use error::{Error, Result};
pub use export::{ExportEnvelope, ImportSummary, RecordExport};
pub use factory::TagFactory;
pub use matching::RecordMatcher;
pub use models::{
    CreateRecordRequest, CreateRecordResponse, DeleteRecordResponse, Record, RecordContent, Tag,
    TagPrefixMatch, TagUsage, UpdateRecordRequest, UpdateRecordResponse,
};
pub use normalize::{NormalizerConfig, TagNormalizer, UnicodeForm};
pub use parse::TagParser;
pub use traits::{RecordRepository, TagRepository, UnitOfWork, UnitOfWorkProvider};
pub use validate::{TagValidation, TagValidator, FORBIDDEN_CHARS, MAX_TAG_LENGTH};
