//! The per-dataset extraction pipeline: pull record subtrees from a source,
//! flatten each against one table schema, write the rows.

use crate::error::RecordError;
use crate::flatten::engine::Row;
use crate::flatten::{Flattener, TableSchema, TableWriter};
use crate::source::RecordSource;
use crate::tree::Element;
use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::warn;

/// Counters reported after a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    /// Compound records read from the source.
    pub records: u64,
    /// Rows written, excluding the header.
    pub rows: u64,
    /// Records skipped because no application identifier was found.
    pub skipped: u64,
}

impl ExtractStats {
    pub fn merge(&mut self, other: ExtractStats) {
        self.records += other.records;
        self.rows += other.rows;
        self.skipped += other.skipped;
    }
}

/// Drives one [`Flattener`] over a record stream.
pub struct Extractor {
    flattener: Flattener,
}

impl Extractor {
    pub fn new(schema: TableSchema) -> Self {
        Extractor {
            flattener: Flattener::new(schema),
        }
    }

    pub fn schema(&self) -> &TableSchema {
        self.flattener.schema()
    }

    /// Flatten one record, or `None` when it carries no usable identifier.
    /// The skip is logged here so every caller reports it the same way.
    pub fn extract_record(&self, record: &Element) -> Option<Vec<Row>> {
        match self.flattener.flatten(record) {
            Ok(rows) => Some(rows),
            Err(RecordError::MissingIdentifier) => {
                warn!(
                    table = %self.schema().name,
                    "record has no application identifier, skipping"
                );
                None
            }
            Err(RecordError::MalformedIdentifier(ref id)) => {
                warn!(
                    table = %self.schema().name,
                    identifier = %id,
                    "record identifier is malformed, skipping"
                );
                None
            }
        }
    }

    /// Run the full pipeline: every record from `source`, rows to `writer`.
    /// A source error (I/O, malformed XML) aborts the run; a record without
    /// an identifier is skipped and counted.
    pub fn run<R, W>(
        &self,
        source: &mut RecordSource<R>,
        writer: &mut TableWriter<W>,
    ) -> Result<ExtractStats>
    where
        R: BufRead,
        W: Write,
    {
        let mut stats = ExtractStats::default();

        for record in source {
            let record = record?;
            stats.records += 1;

            match self.extract_record(&record) {
                Some(rows) => {
                    for row in &rows {
                        writer.write_row(row)?;
                    }
                    stats.rows += rows.len() as u64;
                }
                None => stats.skipped += 1,
            }
        }

        writer.flush()?;
        Ok(stats)
    }
}
