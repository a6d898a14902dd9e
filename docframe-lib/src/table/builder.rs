use super::{GroupingPolicy, Table, TableSpec, apply_grouping};
use crate::Result;
use crate::documents::Document;
use log::{debug, warn};

const LOG_TARGET: &str = "     table";

/// Build a table by running every row extractor of `spec` over every document.
///
/// Rows appear in document order, then in row-extractor order within a document. Declared
/// column types are applied next; a value that cannot be converted becomes a missing value and
/// the rest of its row is kept. Finally the table is sorted by the spec's sort keys, if any.
#[must_use]
pub fn build_table(documents: &[Document], spec: &TableSpec) -> Table {
    let mut table = Table::with_columns(spec.columns().to_vec());

    for document in documents {
        for extractor in spec.extractors() {
            if let Some(row) = extractor.extract_row(document) {
                table.push_row(row);
            }
        }
    }

    for (index, column_type) in spec.column_types().iter().enumerate() {
        let Some(column_type) = *column_type else { continue };
        let name = spec.columns()[index].clone();

        if let Some(cells) = table.column_at_mut(index) {
            for (row, cell) in cells.iter_mut().enumerate() {
                let Some(value) = cell.take() else { continue };
                *cell = column_type.coerce(&value);
                if cell.is_none() {
                    warn!(target: LOG_TARGET, "column '{name}', row {row}: unable to convert '{value}' to {column_type}");
                }
            }
        }
    }

    if !spec.sort_indices().is_empty() {
        table = table.sorted_by_index(spec.sort_indices());
    }

    debug!(target: LOG_TARGET, "built {} rows from {} documents", table.row_count(), documents.len());
    table
}

/// Build a table, then collapse rows sharing the spec's unique keys using `policy`.
///
/// Aggregating policies reorder rows by key, so the spec's sort is applied again afterwards.
///
/// # Errors
///
/// Returns an error if an aggregating policy meets a non-numeric value outside the unique keys.
pub fn build_grouped_table(documents: &[Document], spec: &TableSpec, policy: GroupingPolicy) -> Result<Table> {
    let table = build_table(documents, spec);
    if spec.unique_keys().is_empty() {
        return Ok(table);
    }

    let grouped = apply_grouping(&table, spec.unique_keys(), policy)?;
    if matches!(policy, GroupingPolicy::Min | GroupingPolicy::Max | GroupingPolicy::Mean) && !spec.sort().is_empty() {
        return grouped.sorted(spec.sort());
    }

    Ok(grouped)
}
