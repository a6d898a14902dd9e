//! Building tables out of document collections
//!
//! # Implementation Model
//!
//! A [`TableSpec`] pairs a list of column names with the [`RowExtractor`](crate::extract::RowExtractor)s
//! that produce rows for them, plus optional column types, sort keys and unique keys. Specs are
//! checked as they are assembled, so a width mismatch or an unknown column name is reported before
//! any document is read. Specs come either from code or from a declarative [`TableDef`], whose
//! column references are resolved against an explicitly supplied [`ExtractorMap`].
//!
//! [`build_table`] runs every row extractor over every document, applies column types, then sorts.
//! Values that fail type conversion become missing cells and a warning is logged; they never abort
//! the build.
//!
//! [`apply_grouping`] collapses rows sharing unique-key values into one, either by keeping the
//! latest row or by aggregating each remaining column. All sorting and grouping share one total
//! order over cells in which missing values come last.

mod builder;
mod column_type;
mod definition;
mod grouping;
mod lookup;
mod ordering;
#[expect(clippy::module_inception, reason = "the table type lives in its own file like every other type")]
mod table;
mod table_spec;

pub use builder::{build_grouped_table, build_table};
pub use column_type::{ColumnType, parse_datetime};
pub use definition::{ColumnDef, ExtractorMap, RowDef, TableDef, resolve_extractors};
pub use grouping::{GroupingPolicy, apply_grouping};
pub use ordering::{SortKey, cells_equal, compare_cells, compare_values};
pub use table::Table;
pub use table_spec::TableSpec;

pub(crate) use lookup::suggest;
