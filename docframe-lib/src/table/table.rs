use super::lookup::column_index;
use super::ordering::{SortKey, cells_equal, compare_cells};
use crate::Result;
use crate::extract::CellValue;
use compact_str::CompactString;
use ohno::bail;

/// Column-major tabular data.
///
/// Every column holds the same number of cells. A `None` cell is a missing value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<CompactString>,
    data: Vec<Vec<Option<CellValue>>>,
}

impl Table {
    /// An empty table with the given columns.
    ///
    /// # Errors
    ///
    /// Returns an error if a column name appears twice.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        let columns: Vec<CompactString> = columns.into_iter().map(Into::into).collect();
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                bail!("duplicate column name '{name}'");
            }
        }

        Ok(Self::with_columns(columns))
    }

    /// An empty table over column names already known to be unique.
    pub(crate) fn with_columns(columns: Vec<CompactString>) -> Self {
        let data = vec![Vec::new(); columns.len()];
        Self { columns, data }
    }

    /// Build a table from row-major data.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate column names or if a row's width differs from the number of columns.
    pub fn from_rows<I, S>(columns: I, rows: impl IntoIterator<Item = Vec<Option<CellValue>>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        let mut table = Self::new(columns)?;
        for row in rows {
            if row.len() != table.columns.len() {
                bail!(
                    "row {} has {} values but the table has {} columns",
                    table.row_count(),
                    row.len(),
                    table.columns.len()
                );
            }
            table.push_row(row);
        }

        Ok(table)
    }

    /// Append a row whose width has already been checked.
    pub(crate) fn push_row(&mut self, row: Vec<Option<CellValue>>) {
        debug_assert_eq!(row.len(), self.columns.len());
        for (column, value) in self.data.iter_mut().zip(row) {
            column.push(value);
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[CompactString] {
        &self.columns
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The cells of the named column, top to bottom.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Option<CellValue>]> {
        self.column_index(name).and_then(|i| self.data.get(i)).map(Vec::as_slice)
    }

    pub(crate) fn column_at_mut(&mut self, index: usize) -> Option<&mut Vec<Option<CellValue>>> {
        self.data.get_mut(index)
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.data.get(column).and_then(|c| c.get(row)).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn row(&self, row: usize) -> Vec<Option<&CellValue>> {
        (0..self.columns.len()).map(|c| self.cell(row, c)).collect()
    }

    /// Rows in table order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<&CellValue>>> + '_ {
        (0..self.row_count()).map(|r| self.row(r))
    }

    /// A new table holding the given rows, in the given order.
    pub(crate) fn select(&self, rows: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            data: self
                .data
                .iter()
                .map(|column| rows.iter().map(|&r| column.get(r).cloned().flatten()).collect())
                .collect(),
        }
    }

    /// A copy of the table sorted by `keys`, keeping the relative order of rows with equal keys.
    ///
    /// # Errors
    ///
    /// Returns an error if a key names an unknown column.
    pub fn sorted(&self, keys: &[SortKey]) -> Result<Self> {
        let keys = keys
            .iter()
            .map(|k| Ok((column_index(&self.columns, &k.column, "sort")?, k.descending)))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.sorted_by_index(&keys))
    }

    /// Stable sort by `(column index, descending)` pairs that are known to be in range.
    pub(crate) fn sorted_by_index(&self, keys: &[(usize, bool)]) -> Self {
        let mut order: Vec<usize> = (0..self.row_count()).collect();
        order.sort_by(|&a, &b| {
            keys.iter()
                .map(|&(column, descending)| compare_cells(self.cell(a, column), self.cell(b, column), descending))
                .find(|o| o.is_ne())
                .unwrap_or(core::cmp::Ordering::Equal)
        });

        self.select(&order)
    }

    fn matching_rows(&self, criteria: &[(&str, CellValue)]) -> Result<Vec<usize>> {
        let criteria = criteria
            .iter()
            .map(|(name, value)| Ok((column_index(&self.columns, name, "filter")?, value)))
            .collect::<Result<Vec<_>>>()?;

        Ok((0..self.row_count())
            .filter(|&r| criteria.iter().all(|&(c, value)| cells_equal(self.cell(r, c), Some(value))))
            .collect())
    }

    /// The rows where every named column equals the given value.
    ///
    /// # Errors
    ///
    /// Returns an error if a criterion names an unknown column.
    pub fn filter(&self, criteria: &[(&str, CellValue)]) -> Result<Self> {
        Ok(self.select(&self.matching_rows(criteria)?))
    }

    /// The value of `column` when exactly one row matches `criteria`.
    ///
    /// # Errors
    ///
    /// Returns an error if `column` or a criterion names an unknown column.
    pub fn single_value(&self, column: &str, criteria: &[(&str, CellValue)]) -> Result<Option<&CellValue>> {
        let column = column_index(&self.columns, column, "single value")?;
        let rows = self.matching_rows(criteria)?;
        Ok(match rows.as_slice() {
            [row] => self.cell(*row, column),
            _ => None,
        })
    }
}
