use super::common;
use crate::Result;
use crate::table::Table;
use compact_str::CompactString;
use core::fmt::Write;
use ohno::{IntoAppError, app_err};

/// Write `table` as CSV: a header of column names, then one record per row with null cells empty.
pub fn generate<W: Write>(table: &Table, writer: &mut W) -> Result<()> {
    let mut csv_writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    csv_writer
        .write_record(table.columns().iter().map(CompactString::as_str))
        .into_app_err("writing CSV header")?;

    for row in table.rows() {
        csv_writer
            .write_record(row.into_iter().map(common::format_cell))
            .into_app_err("writing CSV record")?;
    }

    let bytes = csv_writer
        .into_inner()
        .map_err(|e| app_err!("flushing CSV output: {}", e.error()))?;
    let text = String::from_utf8(bytes).into_app_err("CSV output is not valid UTF-8")?;

    writer.write_str(&text)?;
    Ok(())
}
