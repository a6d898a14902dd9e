//! Command dispatch logic for docframe

use super::{
    InitArgs, MeasurementsArgs, SeriesArgs, TablesArgs, ValidateArgs, init_config, process_measurements, process_series,
    process_tables, validate_config,
};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "docframe", author, version, long_about = None)]
#[command(about = "Turn semi-structured test-result documents into typed tables")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: DocframeSubcommand,
}

#[derive(Subcommand, Debug)]
enum DocframeSubcommand {
    /// Build the configured tables and generate reports
    Tables(Box<TablesArgs>),
    /// List the measurements found in the documents
    Measurements(Box<MeasurementsArgs>),
    /// Build one table per measurement, with a row per aggregation
    Series(Box<SeriesArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if the executed command fails
pub fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = Cli::parse_from(args);

    match &cli.command {
        DocframeSubcommand::Tables(tables_args) => process_tables(host, tables_args),
        DocframeSubcommand::Measurements(measurements_args) => process_measurements(host, measurements_args),
        DocframeSubcommand::Series(series_args) => process_series(host, series_args),
        DocframeSubcommand::Init(init_args) => init_config(host, init_args),
        DocframeSubcommand::Validate(validate_args) => validate_config(host, validate_args),
    }
}
