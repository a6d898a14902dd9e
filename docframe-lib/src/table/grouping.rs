use super::Table;
use super::lookup::column_index;
use super::ordering::compare_cells;
use crate::Result;
use crate::extract::CellValue;
use clap::ValueEnum;
use core::cmp::Ordering;
use log::debug;
use ohno::bail;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

const LOG_TARGET: &str = "  grouping";

/// How rows sharing the same unique-key values are collapsed into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Deserialize, Serialize, Display, EnumString)]
#[value(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GroupingPolicy {
    /// Leave the table unchanged
    None,

    /// Keep the last row of each group
    #[default]
    Latest,

    /// Smallest value of each column per group
    Min,

    /// Largest value of each column per group
    Max,

    /// Arithmetic mean of each column per group
    Mean,
}

impl GroupingPolicy {
    const fn is_aggregate(self) -> bool {
        matches!(self, Self::Min | Self::Max | Self::Mean)
    }
}

/// Key values of one row, ordered with the same total order used for sorting.
#[derive(Debug)]
struct RowKey<'a>(Vec<Option<&'a CellValue>>);

impl Ord for RowKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| compare_cells(*a, *b, false))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for RowKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RowKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RowKey<'_> {}

fn row_key<'a>(table: &'a Table, key_columns: &[usize], row: usize) -> RowKey<'a> {
    RowKey(key_columns.iter().map(|&c| table.cell(row, c)).collect())
}

/// Collapse rows that share the same values in `keys` according to `policy`.
///
/// With no keys, or with [`GroupingPolicy::None`], the table is returned unchanged.
///
/// `Latest` keeps the last row of each group and preserves table order. The aggregating
/// policies emit one row per group in ascending key order, with the key columns first. Rows
/// with a missing key value are dropped and missing values are skipped. A column whose values
/// are all missing aggregates to a missing value.
///
/// # Errors
///
/// Returns an error if a key names an unknown column, or if an aggregating policy meets a
/// non-numeric value outside the key columns.
pub fn apply_grouping<K: AsRef<str>>(table: &Table, keys: &[K], policy: GroupingPolicy) -> Result<Table> {
    let key_columns = keys
        .iter()
        .map(|k| column_index(table.columns(), k.as_ref(), "grouping"))
        .collect::<Result<Vec<_>>>()?;

    if key_columns.is_empty() || policy == GroupingPolicy::None {
        return Ok(table.clone());
    }

    let result = if policy.is_aggregate() {
        aggregate(table, &key_columns, policy)?
    } else {
        let mut last = BTreeMap::new();
        for row in 0..table.row_count() {
            let _ = last.insert(row_key(table, &key_columns, row), row);
        }

        let mut keep: Vec<usize> = last.into_values().collect();
        keep.sort_unstable();
        table.select(&keep)
    };

    debug!(target: LOG_TARGET, "grouped {} rows into {} using '{policy}'", table.row_count(), result.row_count());
    Ok(result)
}

fn aggregate(table: &Table, key_columns: &[usize], policy: GroupingPolicy) -> Result<Table> {
    let value_columns: Vec<usize> = (0..table.columns().len()).filter(|c| !key_columns.contains(c)).collect();

    for &c in &value_columns {
        let mut cells = (0..table.row_count()).filter_map(|r| table.cell(r, c));
        if let Some(bad) = cells.find(|v| !v.is_numeric()) {
            bail!(
                "cannot apply '{policy}' grouping to column '{}': value '{bad}' is not numeric",
                table.columns()[c]
            );
        }
    }

    let mut groups: BTreeMap<RowKey<'_>, Vec<usize>> = BTreeMap::new();
    for row in 0..table.row_count() {
        let key = row_key(table, key_columns, row);
        if key.0.iter().all(Option::is_some) {
            groups.entry(key).or_default().push(row);
        }
    }

    let columns = key_columns.iter().chain(&value_columns).map(|&c| table.columns()[c].clone()).collect();
    let mut result = Table::with_columns(columns);

    for (key, rows) in groups {
        let mut out: Vec<Option<CellValue>> = key.0.into_iter().map(|v| v.cloned()).collect();
        for &c in &value_columns {
            let values: Vec<&CellValue> = rows.iter().filter_map(|&r| table.cell(r, c)).collect();
            out.push(reduce(&values, policy));
        }
        result.push_row(out);
    }

    Ok(result)
}

#[expect(clippy::cast_precision_loss, reason = "group sizes are far below 2^53")]
fn reduce(values: &[&CellValue], policy: GroupingPolicy) -> Option<CellValue> {
    if values.is_empty() {
        return None;
    }

    let ints: Option<Vec<i64>> = values
        .iter()
        .map(|v| match v {
            CellValue::Int(i) => Some(*i),
            _ => None,
        })
        .collect();
    let floats = values.iter().filter_map(|v| v.as_f64());

    match (policy, ints) {
        (GroupingPolicy::Min, Some(ints)) => ints.into_iter().min().map(CellValue::Int),
        (GroupingPolicy::Max, Some(ints)) => ints.into_iter().max().map(CellValue::Int),
        (GroupingPolicy::Min, None) => floats.reduce(f64::min).map(CellValue::Float),
        (GroupingPolicy::Max, None) => floats.reduce(f64::max).map(CellValue::Float),
        (GroupingPolicy::Mean, _) => Some(CellValue::Float(floats.sum::<f64>() / values.len() as f64)),
        (GroupingPolicy::None | GroupingPolicy::Latest, _) => None,
    }
}
