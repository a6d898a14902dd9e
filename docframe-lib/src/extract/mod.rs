//! Pulling cells and rows out of documents
//!
//! # Implementation Model
//!
//! A [`ValueExtractor`] turns one document into at most one [`CellValue`]. Four kinds exist:
//! constants, compiled path queries, ordered fallbacks, and boolean coercions. Path queries are
//! compiled when the extractor is built, so an extractor set is immutable by the time any
//! document is processed.
//!
//! A [`RowExtractor`] groups value extractors into a row. Unless it accepts nulls, a single
//! missing value discards the whole row for that document.
//!
//! [`generate_extractors`] mechanically builds the row extractors needed to tabulate every
//! aggregation of a measurement.

mod cell_value;
mod generator;
mod path_query;
mod row_extractor;
mod value_extractor;

pub use cell_value::CellValue;
pub use generator::{AggregationRef, MEASUREMENT_COLUMN, VALUE_COLUMN, generate_extractors, generated_columns};
pub use path_query::PathQuery;
pub use row_extractor::RowExtractor;
pub use value_extractor::ValueExtractor;
