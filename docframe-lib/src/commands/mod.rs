//! Command-line interface and orchestration for docframe
//!
//! This module implements the CLI commands and wires document loading, table building,
//! measurement consolidation and reporting together.
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **tables**: Build the tables declared in the configuration from a document file,
//!   collapse repeated rows with the grouping policy, and generate reports
//! - **measurements**: Consolidate and list the measurements the documents report
//! - **series**: Build one table per measurement with generated row extractors, one row
//!   per aggregation and document
//! - **init**: Generate a default configuration file
//! - **validate**: Check that a configuration file parses and that every table resolves
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes to the
//! appropriate command handler. The document-reading commands follow the same pattern:
//!
//! 1. Set up logging and load the configuration
//! 2. Load documents, keep those matching the label filter, and drop repeated runs
//! 3. Build tables
//! 4. Generate reports to the console, CSV files and/or a JSON file
//!
//! The `common` module holds the shared arguments and the report fan-out. All output
//! goes through a [`Host`] so commands can be driven from tests.

mod common;
mod config;
mod host;
mod init;
mod measurements;
mod run;
mod series;
mod tables;
mod validate;

#[cfg(debug_assertions)]
pub use config::Config;

pub use host::Host;
pub use init::{InitArgs, init_config};
pub use measurements::{MeasurementsArgs, process_measurements};
pub use run::run;
pub use series::{SeriesArgs, process_series};
pub use tables::{TablesArgs, process_tables};
pub use validate::{ValidateArgs, validate_config};
