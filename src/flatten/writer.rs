use crate::flatten::engine::Row;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one tab-separated table: a fixed header row, then each data row as
/// tab-joined cells. Empty cells are empty strings, never omitted columns.
pub struct TableWriter<W: Write> {
    writer: W,
    rows_written: u64,
}

impl TableWriter<BufWriter<File>> {
    /// Create the output file and write the header row immediately.
    pub fn create<P: AsRef<Path>>(path: P, header: &[String]) -> Result<Self> {
        let file = File::create(&path).with_context(|| {
            format!("failed to create output file: {}", path.as_ref().display())
        })?;
        Self::new(BufWriter::new(file), header)
    }
}

impl<W: Write> TableWriter<W> {
    pub fn new(mut writer: W, header: &[String]) -> Result<Self> {
        writeln!(writer, "{}", header.join("\t")).context("failed to write header row")?;
        Ok(TableWriter {
            writer,
            rows_written: 0,
        })
    }

    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        writeln!(self.writer, "{}", row.join("\t")).context("failed to write row")?;
        self.rows_written += 1;
        Ok(())
    }

    /// Data rows written so far, excluding the header.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("failed to flush writer")
    }
}
