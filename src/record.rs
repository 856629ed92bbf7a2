//! Fixed-format record parsing.
//!
//! Data files are `|`-delimited with a header line. There is no quoting, no
//! escaping and no trimming: every byte between two delimiters is the value.
//! A line may omit trailing fields (they read as empty), but it may not carry
//! more fields than the header. Blank lines are skipped by [`RecordReader`]:
//! they yield no record and are not counted, but later records keep their
//! real line numbers.

use crate::error::{LoadError, Result};
use std::io::Read;

/// Column separator of data files.
pub const FIELD_DELIMITER: u8 = b'|';

/// Column names of a data file, parsed once per file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    columns: Vec<String>,
}

impl Header {
    /// Parse a header line.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        Self::from_columns(split_fields(line).map(String::from).collect())
    }

    #[must_use]
    pub fn from_columns(columns: Vec<String>) -> Self {
        Self { columns }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Align `fields` to this header, padding missing trailing fields with
    /// empty strings.
    ///
    /// # Errors
    /// [`LoadError::MalformedRecord`] if there are more fields than columns.
    pub fn record<'a>(&self, line: u64, fields: impl IntoIterator<Item = &'a str>) -> Result<Record> {
        let mut values: Vec<String> = fields.into_iter().map(String::from).collect();
        if values.len() > self.columns.len() {
            return Err(LoadError::MalformedRecord {
                line,
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        values.resize(self.columns.len(), String::new());
        Ok(Record { line, values })
    }
}

/// One data line, positionally aligned to its file's [`Header`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number in the source file (the header is line 1).
    pub line: u64,
    pub values: Vec<String>,
}

impl Record {
    /// Raw value of column `index`; empty if out of range.
    #[must_use]
    pub fn value(&self, index: usize) -> &str {
        self.values.get(index).map_or("", String::as_str)
    }

    /// Pairs of `(column name, raw value)` in column order.
    pub fn fields<'a>(&'a self, header: &'a Header) -> impl Iterator<Item = (&'a str, &'a str)> {
        header
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(char::from(FIELD_DELIMITER))
}

/// Parse a single data line against `header`.
///
/// # Errors
/// [`LoadError::MalformedRecord`] if the line has more fields than the header.
pub fn parse_line(header: &Header, line_number: u64, line: &str) -> Result<Record> {
    header.record(line_number, split_fields(line))
}

/// Streaming reader yielding [`Record`]s from `|`-delimited input.
///
/// The first line is consumed as the header on construction. Blank lines are
/// skipped.
pub struct RecordReader<R: Read> {
    header: Header,
    records: csv::StringRecordsIntoIter<R>,
}

impl<R: Read> RecordReader<R> {
    /// # Errors
    /// Returns an error if the header line cannot be read.
    pub fn new(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(FIELD_DELIMITER)
            .quoting(false)
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);
        let header = Header::from_columns(rdr.headers()?.iter().map(String::from).collect());
        Ok(Self {
            header,
            records: rdr.into_records(),
        })
    }

    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = match self.records.next()? {
            Ok(raw) => raw,
            Err(e) => return Some(Err(e.into())),
        };
        let line = raw.position().map_or(0, csv::Position::line);
        Some(self.header.record(line, raw.iter()))
    }
}
