//! Bounded retry of whole transactions.
//!
//! [`commit_with_retry`] runs "open transaction, stage the write set, commit"
//! until a commit succeeds. Every failed commit discards the transaction and
//! replays the entire write set in a fresh one, so a sub-batch is applied
//! exactly once or not at all. Once the number of failed commits exceeds the
//! ceiling the sub-batch is abandoned with [`LoadError::RetriesExhausted`].
//!
//! Errors raised while *staging* are not conflicts: the transaction is rolled
//! back and the error returned at once.

use crate::error::{LoadError, Result};
use crate::store::{GraphStore, Transaction};
use tracing::{debug, error};

/// Default ceiling on failed commits per sub-batch.
pub const DEFAULT_MAX_RETRIES: u32 = 1000;

/// Source position of a sub-batch, used in failure reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineRange {
    pub file: String,
    pub first_line: u64,
    pub last_line: u64,
}

/// Result of a successful commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Committed<T> {
    /// Whatever the final, committed staging pass returned.
    pub value: T,
    /// Commits that failed before this one succeeded.
    pub failures: u32,
}

/// Stage and commit with full replay on failure.
///
/// `stage` is called once per attempt with a fresh transaction; its return
/// value from the committed attempt is handed back.
///
/// # Errors
/// - [`LoadError::RetriesExhausted`] after more than `max_retries` failed commits.
/// - Any error from `stage` or from opening a transaction, unchanged.
pub fn commit_with_retry<S, T, F>(
    store: &S,
    max_retries: u32,
    range: &LineRange,
    mut stage: F,
) -> Result<Committed<T>>
where
    S: GraphStore,
    F: FnMut(&mut S::Tx) -> Result<T>,
{
    let mut failures: u32 = 0;
    loop {
        let mut tx = store.new_transaction()?;
        let value = match stage(&mut tx) {
            Ok(value) => value,
            Err(e) => {
                tx.rollback();
                return Err(e);
            }
        };
        match tx.commit() {
            Ok(()) => return Ok(Committed { value, failures }),
            Err(e) => {
                failures += 1;
                debug!(
                    file = %range.file,
                    first_line = range.first_line,
                    last_line = range.last_line,
                    failures,
                    "commit failed, replaying sub-batch: {e}"
                );
                if failures > max_retries {
                    error!(
                        file = %range.file,
                        first_line = range.first_line,
                        last_line = range.last_line,
                        "giving up after {failures} failed commits"
                    );
                    return Err(LoadError::RetriesExhausted {
                        failures,
                        file: range.file.clone(),
                        first_line: range.first_line,
                        last_line: range.last_line,
                    });
                }
            }
        }
    }
}
