//! Common utilities shared across report generators.

use crate::extract::CellValue;
use crate::measurements::MeasurementInfo;

/// Format a cell as text. Null cells are empty; datetimes use RFC 3339.
pub fn format_cell(value: Option<&CellValue>) -> String {
    value.map_or_else(String::new, ToString::to_string)
}

/// Format a measurement's aggregations as `id (name)` pairs, leaving out names equal to the id.
pub fn format_aggregations(measurement: &MeasurementInfo) -> String {
    let mut result = String::new();
    for (i, aggregation) in measurement.aggregations.iter().enumerate() {
        if i > 0 {
            result.push_str(", ");
        }
        result.push_str(&aggregation.id);
        if aggregation.name != aggregation.id {
            result.push_str(" (");
            result.push_str(&aggregation.name);
            result.push(')');
        }
    }
    result
}
