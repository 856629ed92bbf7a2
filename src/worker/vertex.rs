//! Vertex loader worker.

use super::SubBatchReport;
use crate::coerce::TypedPropertySet;
use crate::error::Result;
use crate::partition::SubBatch;
use crate::record::Header;
use crate::retry::{LineRange, commit_with_retry};
use crate::schema::Schema;
use crate::store::{GraphStore, Transaction};

/// Creates one vertex per record of a sub-batch.
///
/// Single-valued properties travel with the vertex-creation call; each value
/// of a list property is appended afterwards.
pub struct VertexLoader<'a, S> {
    pub store: &'a S,
    pub schema: &'a Schema,
    pub header: &'a Header,
    pub label: &'a str,
    /// File name, for diagnostics and failure reports.
    pub file: &'a str,
    pub max_retries: u32,
}

impl<S: GraphStore> VertexLoader<'_, S> {
    /// Load `sub` in one transaction, replaying it on commit failure.
    ///
    /// # Errors
    /// Coercion errors, store errors raised while staging, or
    /// `RetriesExhausted`.
    pub fn load(&self, sub: &SubBatch) -> Result<SubBatchReport> {
        if sub.is_empty() {
            return Ok(SubBatchReport::for_worker(sub.worker, 0));
        }
        let range = LineRange {
            file: self.file.to_string(),
            first_line: sub.first_line(),
            last_line: sub.last_line(),
        };
        let committed = commit_with_retry(self.store, self.max_retries, &range, |tx| {
            self.stage(tx, sub)
        })?;
        let mut report = committed.value;
        report.conflicts = committed.failures;
        Ok(report)
    }

    fn stage(&self, tx: &mut S::Tx, sub: &SubBatch) -> Result<SubBatchReport> {
        let mut report = SubBatchReport::for_worker(sub.worker, sub.len());
        for record in &sub.records {
            let props = TypedPropertySet::for_vertex(
                self.schema,
                self.header.columns(),
                &record.values,
                record.line,
            )?;
            let vertex = tx.add_vertex(self.label, &props.single)?;
            for (key, values) in props.lists {
                for value in values {
                    tx.append_property(&vertex, &key, value)?;
                }
            }
            report.vertices_created += 1;
            report.record_omissions(self.file, record.line, props.omitted);
        }
        Ok(report)
    }
}
