//! Edge loader worker.

use super::SubBatchReport;
use crate::coerce::{Coercion, TypedPropertySet, coerce_as};
use crate::diagnostics::{Diagnostic, Endpoint};
use crate::error::{LoadError, Result};
use crate::partition::SubBatch;
use crate::record::Header;
use crate::retry::{LineRange, commit_with_retry};
use crate::schema::Schema;
use crate::store::{GraphStore, Transaction};

/// Creates one edge per record (two if undirected) between vertices found by
/// key.
///
/// Column 0 and column 1 hold the endpoint keys; they are looked up on the
/// vertex properties `out_key` and `in_key`. The remaining columns become edge
/// properties. A record whose endpoints are not both found, including keys
/// that do not parse as the key property's type, is skipped and reported as a
/// diagnostic.
pub struct EdgeLoader<'a, S> {
    pub store: &'a S,
    pub schema: &'a Schema,
    pub header: &'a Header,
    pub label: &'a str,
    /// File name, for diagnostics and failure reports.
    pub file: &'a str,
    pub out_key: &'a str,
    pub in_key: &'a str,
    /// Also create the reverse edge for every record.
    pub undirected: bool,
    pub max_retries: u32,
}

impl<S: GraphStore> EdgeLoader<'_, S> {
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
        let columns = self.header.columns().get(2..).unwrap_or(&[]);
        for record in &sub.records {
            let (out_raw, in_raw) = (record.value(0), record.value(1));
            let out_v = self.resolve(tx, self.out_key, out_raw, record.line)?;
            let in_v = self.resolve(tx, self.in_key, in_raw, record.line)?;
            let (out_v, in_v) = match (out_v, in_v) {
                (Some(out_v), Some(in_v)) => (out_v, in_v),
                (out_v, in_v) => {
                    let missing = match (out_v.is_none(), in_v.is_none()) {
                        (true, true) => Endpoint::Both,
                        (true, false) => Endpoint::Out,
                        _ => Endpoint::In,
                    };
                    report.records_skipped += 1;
                    report.diagnostics.push(Diagnostic::EndpointMissing {
                        file: self.file.to_string(),
                        line: record.line,
                        label: self.label.to_string(),
                        out_key: self.out_key.to_string(),
                        out_value: out_raw.to_string(),
                        in_key: self.in_key.to_string(),
                        in_value: in_raw.to_string(),
                        missing,
                    });
                    continue;
                }
            };

            let values = record.values.get(2..).unwrap_or(&[]);
            let props = TypedPropertySet::for_edge(self.schema, columns, values, record.line)?;
            tx.add_edge(&out_v, self.label, &in_v, &props.single)?;
            report.edges_created += 1;
            if self.undirected {
                tx.add_edge(&in_v, self.label, &out_v, &props.single)?;
                report.edges_created += 1;
            }
            report.record_omissions(self.file, record.line, props.omitted);
        }
        Ok(report)
    }

    /// Look up the vertex whose `key` equals the coerced `raw` value. An empty
    /// key, or one that does not parse as the key's type, resolves to nothing.
    fn resolve(
        &self,
        tx: &mut S::Tx,
        key: &str,
        raw: &str,
        line: u64,
    ) -> Result<Option<<S::Tx as Transaction>::Vertex>> {
        if raw.is_empty() {
            return Ok(None);
        }
        let spec = self.schema.require(key)?;
        let value = match coerce_as(spec.semantic_type, key, raw) {
            Ok(Coercion::Value(v)) => v,
            // no vertex can carry a key of the wrong type
            Ok(Coercion::Omitted { .. }) | Err(LoadError::InvalidValue { .. }) => return Ok(None),
            Err(e) => return Err(e.at_line(line)),
        };
        Ok(tx.find_vertex(key, &value)?)
    }
}
