use super::lookup::column_index;
use super::{ColumnType, SortKey};
use crate::Result;
use crate::extract::RowExtractor;
use compact_str::CompactString;
use ohno::bail;

/// The recipe for building one table from a document collection.
///
/// A spec is validated as it is assembled, so an inconsistent spec is rejected before any
/// document is processed. Once built it is immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    columns: Vec<CompactString>,
    extractors: Vec<RowExtractor>,
    column_types: Vec<Option<ColumnType>>,
    sort: Vec<SortKey>,
    sort_indices: Vec<(usize, bool)>,
    unique_keys: Vec<CompactString>,
}

impl TableSpec {
    /// # Errors
    ///
    /// Returns an error if a column name is repeated, or if a row extractor's width differs from
    /// the number of columns.
    pub fn new<I, S>(columns: I, extractors: Vec<RowExtractor>) -> Result<Self>
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

        for (i, extractor) in extractors.iter().enumerate() {
            if extractor.width() != columns.len() {
                bail!(
                    "row extractor {i} produces {} values but there are {} columns",
                    extractor.width(),
                    columns.len()
                );
            }
        }

        Ok(Self {
            column_types: vec![None; columns.len()],
            columns,
            extractors,
            sort: Vec::new(),
            sort_indices: Vec::new(),
            unique_keys: Vec::new(),
        })
    }

    /// Declare the type of one column.
    ///
    /// # Errors
    ///
    /// Returns an error if `column` is not one of the spec's columns.
    pub fn with_column_type(mut self, column: &str, column_type: ColumnType) -> Result<Self> {
        let index = column_index(&self.columns, column, "column type")?;
        self.column_types[index] = Some(column_type);
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error if a key names an unknown column.
    pub fn with_sort(mut self, keys: Vec<SortKey>) -> Result<Self> {
        self.sort_indices = keys
            .iter()
            .map(|k| Ok((column_index(&self.columns, &k.column, "sort")?, k.descending)))
            .collect::<Result<_>>()?;
        self.sort = keys;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error if a key names an unknown column or appears twice.
    pub fn with_unique_keys<I, S>(mut self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        let keys: Vec<CompactString> = keys.into_iter().map(Into::into).collect();
        for (i, key) in keys.iter().enumerate() {
            let _ = column_index(&self.columns, key, "unique columns")?;
            if keys[..i].contains(key) {
                bail!("unique columns: '{key}' is listed twice");
            }
        }

        self.unique_keys = keys;
        Ok(self)
    }

    #[must_use]
    pub fn columns(&self) -> &[CompactString] {
        &self.columns
    }

    #[must_use]
    pub fn extractors(&self) -> &[RowExtractor] {
        &self.extractors
    }

    /// Declared column types, one slot per column.
    #[must_use]
    pub fn column_types(&self) -> &[Option<ColumnType>] {
        &self.column_types
    }

    #[must_use]
    pub fn sort(&self) -> &[SortKey] {
        &self.sort
    }

    pub(crate) fn sort_indices(&self) -> &[(usize, bool)] {
        &self.sort_indices
    }

    #[must_use]
    pub fn unique_keys(&self) -> &[CompactString] {
        &self.unique_keys
    }
}
