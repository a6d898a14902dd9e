//! Report generation for built tables
//!
//! # Implementation Model
//!
//! Three report generators are provided, each accessed through a `generate` function:
//! - **Console**: aligned plain-text tables, with bold headers when colors are enabled
//! - **CSV**: one table per call, header row first, null cells empty
//! - **JSON**: every table plus the consolidated measurement descriptors in one object
//!
//! Generators write to any `core::fmt::Write`, so callers decide whether output goes to a
//! terminal, a file or a test buffer. Cell formatting shared by the text formats lives in
//! `common`.

mod common;
mod console;
mod csv;
mod json;
mod report_table;

pub use console::generate as generate_console;
pub use csv::generate as generate_csv;
pub use json::generate as generate_json;
pub use report_table::ReportTable;
