//! Batch partitioning.
//!
//! A file's record stream is cut into batches of at most `batch_size`
//! records ([`Batches`]); each batch is then cut into contiguous sub-batches,
//! one per worker ([`split_batch`]).
//!
//! Each worker gets a span of `batch_size / thread_count` records (at least
//! one). Worker `t` starts at `span * t`; a worker whose start lies beyond the
//! batch is not launched, so a short final batch runs on fewer workers. The
//! last worker's span runs to the end of the batch, so concatenating the
//! sub-batches in worker order always gives back the batch.

use crate::error::Result;
use crate::record::Record;

/// Contiguous slice of one batch, processed by exactly one worker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubBatch {
    /// Index of the worker within its batch; lower indices hold earlier records.
    pub worker: usize,
    pub records: Vec<Record>,
}

impl SubBatch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// File line of the first record, or 0 for an empty sub-batch.
    #[must_use]
    pub fn first_line(&self) -> u64 {
        self.records.first().map_or(0, |r| r.line)
    }

    /// File line of the last record, or 0 for an empty sub-batch.
    #[must_use]
    pub fn last_line(&self) -> u64 {
        self.records.last().map_or(0, |r| r.line)
    }
}

/// Worker spans over a batch of `len` records as `(worker, start, end)`,
/// end-exclusive.
#[must_use]
pub fn span_ranges(len: usize, batch_size: usize, thread_count: usize) -> Vec<(usize, usize, usize)> {
    let threads = thread_count.max(1);
    let span = (batch_size.max(1) / threads).max(1);
    let mut out = Vec::with_capacity(threads);
    for worker in 0..threads {
        let start = span * worker;
        if start >= len {
            break;
        }
        let end = if worker + 1 == threads {
            len
        } else {
            (start + span).min(len)
        };
        out.push((worker, start, end));
    }
    out
}

/// Split one batch into per-worker sub-batches.
#[must_use]
pub fn split_batch(batch: Vec<Record>, batch_size: usize, thread_count: usize) -> Vec<SubBatch> {
    let ranges = span_ranges(batch.len(), batch_size, thread_count);
    let mut rest = batch;
    let mut out = Vec::with_capacity(ranges.len());
    // ranges tile [0, len), so peeling from the back leaves each span in place
    for &(worker, start, _) in ranges.iter().rev() {
        let records = rest.split_off(start);
        out.push(SubBatch { worker, records });
    }
    out.reverse();
    out
}

/// Iterator of batches of at most `batch_size` records.
///
/// Stops after the first read error, which it yields.
pub struct Batches<I> {
    records: I,
    batch_size: usize,
    done: bool,
}

impl<I> Batches<I> {
    pub fn new(records: I, batch_size: usize) -> Self {
        Self {
            records,
            batch_size: batch_size.max(1),
            done: false,
        }
    }
}

impl<I: Iterator<Item = Result<Record>>> Iterator for Batches<I> {
    type Item = Result<Vec<Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut batch = Vec::with_capacity(self.batch_size.min(4096));
        while batch.len() < self.batch_size {
            match self.records.next() {
                Some(Ok(record)) => batch.push(record),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }
        if batch.is_empty() { None } else { Some(Ok(batch)) }
    }
}

/// Lazily batch `records` and split each batch for `thread_count` workers.
pub fn partition<I>(
    records: I,
    batch_size: usize,
    thread_count: usize,
) -> impl Iterator<Item = Result<Vec<SubBatch>>>
where
    I: Iterator<Item = Result<Record>>,
{
    Batches::new(records, batch_size)
        .map(move |batch| batch.map(|b| split_batch(b, batch_size, thread_count)))
}
