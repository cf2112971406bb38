//! Transaction envelope support.
//!
//! The use cases follow a strict two-phase discipline: `begin` before any
//! write, `commit` only after every write succeeded, and `rollback` on any
//! failure in between. A rollback failure during error handling is logged
//! and swallowed so the original failure reason reaches the caller.

use tracing::warn;

use tagnote_core::traits::UnitOfWork;

/// Roll back the active transaction, suppressing rollback failures.
///
/// Called only on an error path; the caller's original error must survive.
pub(crate) async fn rollback_quietly(uow: &mut dyn UnitOfWork) {
    if let Err(rollback_err) = uow.rollback().await {
        warn!(
            subsystem = "app",
            component = "unit_of_work",
            op = "rollback",
            error = %rollback_err,
            "Rollback failed; surfacing the original error"
        );
    }
}
