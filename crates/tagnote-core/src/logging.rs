//! Structured logging field name constants for tagnote.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, skipped tokens, config choices |

/// Subsystem originating the log event.
/// Values: "app", "db", "core"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "create_record", "tag_parser", "pool", "unit_of_work"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "execute", "parse", "commit", "rollback"
pub const OPERATION: &str = "op";

/// Record UUID being operated on.
pub const RECORD_ID: &str = "record_id";

/// Tag UUID being operated on.
pub const TAG_ID: &str = "tag_id";

/// Number of tags touched by an operation.
pub const TAG_COUNT: &str = "tag_count";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or query.
pub const RESULT_COUNT: &str = "result_count";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
