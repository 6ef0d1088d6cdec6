//! Newline-delimited Singer message output.

use chrono::{DateTime, Utc};
use oxtap_types::RateRow;
use std::io::Write;

use crate::{Message, Result, TapState, stream::{STREAM_NAME, schema_message}};

/// Writes Singer messages as NDJSON, one message per line.
#[derive(Debug)]
pub struct SingerWriter<W: Write> {
    writer: W,
    records_written: u64,
}

impl<W: Write> SingerWriter<W> {
    /// Wraps an output sink, usually stdout.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            records_written: 0,
        }
    }

    /// Writes one message followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_message(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.writer, message)?;
        writeln!(self.writer)?;
        if matches!(message, Message::Record { .. }) {
            self.records_written += 1;
        }
        Ok(())
    }

    /// Writes the `SCHEMA` message of the `historical` stream.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_schema(&mut self) -> Result<()> {
        self.write_message(&schema_message())
    }

    /// Writes one `RECORD` message per row.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_rows<'r>(
        &mut self,
        rows: impl IntoIterator<Item = &'r RateRow>,
        time_extracted: DateTime<Utc>,
    ) -> Result<()> {
        for row in rows {
            self.write_message(&Message::record(STREAM_NAME, row, time_extracted)?)?;
        }
        Ok(())
    }

    /// Writes a `STATE` message and flushes, so the checkpoint is visible downstream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing or flushing fails.
    pub fn write_state(&mut self, state: &TapState) -> Result<()> {
        self.write_message(&Message::state(state)?)?;
        self.flush()
    }

    /// Flushes the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Returns the number of `RECORD` messages written so far.
    #[must_use]
    pub const fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
