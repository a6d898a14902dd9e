use crate::table::Table;
use compact_str::CompactString;

/// A built table with the name it is reported under.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub name: CompactString,
    pub table: Table,
}

impl ReportTable {
    #[must_use]
    pub fn new(name: impl Into<CompactString>, table: Table) -> Self {
        Self { name: name.into(), table }
    }
}
