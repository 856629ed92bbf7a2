//! Sub-batch loader workers.
//!
//! A worker owns one [`SubBatch`](crate::partition::SubBatch) and writes it in
//! a single transaction through [`commit_with_retry`](crate::retry::commit_with_retry):
//!
//! ```text
//! Running -> Committing -> Succeeded
//!               |
//!               v
//!           Conflicted -> Running          (replay, while failures <= ceiling)
//!               |
//!               v
//!             Fatal                        (RetriesExhausted)
//! ```
//!
//! Workers share only the read-only store handle and schema. Everything they
//! produce (counts, diagnostics) is returned in a [`SubBatchReport`] and
//! aggregated by the importer after the batch is joined.

pub mod edge;
pub mod vertex;

pub use edge::EdgeLoader;
pub use vertex::VertexLoader;

use crate::coerce::Omission;
use crate::diagnostics::Diagnostic;

/// Outcome of one committed sub-batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubBatchReport {
    pub worker: usize,
    pub records: usize,
    pub vertices_created: usize,
    pub edges_created: usize,
    /// Edge records dropped because an endpoint was missing.
    pub records_skipped: usize,
    /// Values left out of their record (unparseable dates).
    pub values_omitted: usize,
    /// Failed commits before the successful one.
    pub conflicts: u32,
    pub diagnostics: Vec<Diagnostic>,
}

impl SubBatchReport {
    pub(crate) fn for_worker(worker: usize, records: usize) -> Self {
        Self {
            worker,
            records,
            ..Self::default()
        }
    }

    pub(crate) fn record_omissions(&mut self, file: &str, line: u64, omitted: Vec<Omission>) {
        self.values_omitted += omitted.len();
        self.diagnostics
            .extend(omitted.into_iter().map(|o| Diagnostic::DateOmitted {
                file: file.to_string(),
                line,
                property: o.property,
                value: o.value,
                reason: o.reason,
            }));
    }
}
