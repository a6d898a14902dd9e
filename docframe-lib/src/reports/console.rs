use super::{ReportTable, common};
use crate::Result;
use crate::measurements::MeasurementInfo;
use compact_str::CompactString;
use core::fmt::Write;
use owo_colors::OwoColorize;

const COLUMN_GAP: &str = "  ";
const MEASUREMENT_HEADERS: [&str; 5] = ["id", "name", "unit", "bigger_is_better", "aggregations"];

/// Render each table as aligned text, followed by a listing of the measurements.
pub fn generate<W: Write>(tables: &[ReportTable], measurements: &[MeasurementInfo], use_colors: bool, writer: &mut W) -> Result<()> {
    let mut first = true;

    for report_table in tables {
        if !first {
            writeln!(writer)?;
        }
        first = false;

        let table = &report_table.table;
        let headers: Vec<&str> = table.columns().iter().map(CompactString::as_str).collect();
        let rows: Vec<Vec<String>> = table.rows().map(|row| row.into_iter().map(common::format_cell).collect()).collect();
        write_block(&report_table.name, &headers, &rows, use_colors, writer)?;
    }

    if !measurements.is_empty() {
        if !first {
            writeln!(writer)?;
        }

        let rows: Vec<Vec<String>> = measurements
            .iter()
            .map(|m| {
                vec![
                    m.id.to_string(),
                    m.name.to_string(),
                    m.unit.as_deref().unwrap_or_default().to_string(),
                    m.bigger_is_better.to_string(),
                    common::format_aggregations(m),
                ]
            })
            .collect();
        write_block("measurements", &MEASUREMENT_HEADERS, &rows, use_colors, writer)?;
    }

    Ok(())
}

fn write_block<W: Write>(title: &str, headers: &[&str], rows: &[Vec<String>], use_colors: bool, writer: &mut W) -> Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let count = if rows.len() == 1 { "1 row".to_string() } else { format!("{} rows", rows.len()) };
    if use_colors {
        writeln!(writer, "{} ({count})", title.bold())?;
    } else {
        writeln!(writer, "{title} ({count})")?;
    }

    let header = aligned_line(headers.iter().copied(), &widths);
    if use_colors {
        writeln!(writer, "{}", header.bold())?;
    } else {
        writeln!(writer, "{header}")?;
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(writer, "{}", aligned_line(rule.iter().map(String::as_str), &widths))?;

    for row in rows {
        writeln!(writer, "{}", aligned_line(row.iter().map(String::as_str), &widths))?;
    }

    Ok(())
}

/// Left-align each cell to its column width, without trailing whitespace.
fn aligned_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, (cell, width)) in cells.zip(widths).enumerate() {
        if i > 0 {
            line.push_str(COLUMN_GAP);
        }
        let _ = write!(line, "{cell:<width$}");
    }
    line.truncate(line.trim_end().len());
    line
}
