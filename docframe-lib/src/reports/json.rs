use super::ReportTable;
use crate::Result;
use crate::extract::CellValue;
use crate::measurements::MeasurementInfo;
use core::fmt::Write;
use serde_json::{Value, json};

/// Write tables and measurement descriptors as one pretty-printed JSON object.
///
/// Tables are listed with their column names and row-major cells; null cells become `null`.
/// Object keys are written in sorted order.
pub fn generate<W: Write>(tables: &[ReportTable], measurements: &[MeasurementInfo], writer: &mut W) -> Result<()> {
    let tables: Vec<Value> = tables
        .iter()
        .map(|t| {
            let rows: Vec<Value> = t
                .table
                .rows()
                .map(|row| row.into_iter().map(|cell| cell.map_or(Value::Null, CellValue::to_json)).collect())
                .collect();

            json!({
                "name": t.name.as_str(),
                "columns": t.table.columns(),
                "rows": rows,
            })
        })
        .collect();

    let output = json!({
        "tables": tables,
        "measurements": measurements,
    });

    writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}
