use super::{CellValue, ValueExtractor};
use crate::documents::Document;

/// Turns one document into at most one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowExtractor {
    accepts_null: bool,
    columns: Vec<ValueExtractor>,
}

impl RowExtractor {
    #[must_use]
    pub const fn new(accepts_null: bool, columns: Vec<ValueExtractor>) -> Self {
        Self { accepts_null, columns }
    }

    #[must_use]
    pub const fn accepts_null(&self) -> bool {
        self.accepts_null
    }

    #[must_use]
    pub fn columns(&self) -> &[ValueExtractor] {
        &self.columns
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.columns.len()
    }

    /// Evaluate every column against `document`.
    ///
    /// Unless the extractor accepts nulls, a single missing value discards the whole row.
    #[must_use]
    pub fn extract_row(&self, document: &Document) -> Option<Vec<Option<CellValue>>> {
        let mut row = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = column.extract(document);
            if value.is_none() && !self.accepts_null {
                return None;
            }
            row.push(value);
        }

        Some(row)
    }
}
