use std::fs::File;
use std::io::{self, Write as _};
use std::path::Path;

use csv::ByteRecord;
use recipe_table::{ScalarValue, Table};
use tracing::debug;

use crate::dialect::DialectOptions;
use crate::errors::Result;

/// Writes tables as CSV.
///
/// Columns are written in table order. Nulls become empty fields, dates use
/// `%Y-%m-%d` and booleans `true`/`false`. The header is written once, from
/// the first table written.
pub struct CsvWriter<W: io::Write> {
    writer: csv::Writer<W>,

    /// Whether to write a header row at all.
    header: bool,

    /// If we've already written the header.
    did_write_header: bool,

    /// Buffer used for formatting values.
    format_buf: Vec<u8>,

    /// Buffer for current record.
    record: ByteRecord,
}

impl<W: io::Write> CsvWriter<W> {
    pub fn new(inner: W, dialect: DialectOptions, header: bool) -> Self {
        let writer = dialect.writer_builder().from_writer(inner);
        CsvWriter {
            writer,
            header,
            did_write_header: false,
            format_buf: Vec::with_capacity(1024),
            record: ByteRecord::new(),
        }
    }

    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        if self.header && !self.did_write_header {
            self.record.clear();
            for name in table.column_names() {
                self.record.push_field(name.as_bytes());
            }
            self.writer.write_byte_record(&self.record)?;
            self.did_write_header = true;
        }

        for row in 0..table.num_rows() {
            self.record.clear();
            for col in table.columns() {
                self.format_buf.clear();
                match &col.values()[row] {
                    ScalarValue::Null => (),
                    ScalarValue::Utf8(s) => self.format_buf.extend_from_slice(s.as_bytes()),
                    other => write!(&mut self.format_buf, "{other}")?,
                }
                self.record.push_field(&self.format_buf);
            }
            self.writer.write_byte_record(&self.record)?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}

/// Write a table to a new file at `path`, replacing any existing file.
pub fn write_table_to_path(
    path: impl AsRef<Path>,
    table: &Table,
    dialect: DialectOptions,
    header: bool,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = CsvWriter::new(io::BufWriter::new(file), dialect, header);
    writer.write_table(table)?;
    writer.flush()?;
    debug!(
        path = %path.display(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        "wrote csv"
    );
    Ok(())
}
