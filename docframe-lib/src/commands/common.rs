//! Processing shared by the commands that read documents and write reports.

use super::Host;
use super::config::Config;
use crate::Result;
use crate::documents::{Document, DocumentSource, JsonFileSource, LabelFilter, LabelPair, check_documents};
use crate::measurements::MeasurementInfo;
use crate::reports::{ReportTable, generate_console, generate_csv, generate_json};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};
use log::info;
use ohno::IntoAppError;
use std::fs;
use std::io::Write;

const LOG_TARGET: &str = "   reports";

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared by every command that reads the configuration
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Path to configuration file (default is `docframe.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,
}

/// Where documents come from and which of them to use
#[derive(Args, Debug)]
pub struct DocumentArgs {
    /// JSON array or newline-delimited JSON file holding test-result documents
    #[arg(long, short = 'd', value_name = "PATH")]
    pub documents: Utf8PathBuf,

    /// Only use documents carrying this label value (format: `name=value`, can be repeated)
    #[arg(long, value_name = "NAME=VALUE")]
    pub filter: Vec<LabelPair>,
}

/// Where reports go
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Write each table to `<DIR>/<table>.csv`
    #[arg(long, value_name = "DIR", help_heading = "Report Output")]
    pub csv: Option<Utf8PathBuf>,

    /// Write every table to a JSON file
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub json: Option<Utf8PathBuf>,

    /// Output tables to the console. If omitted, console output is shown only when no other reports are generated.
    #[arg(long, help_heading = "Report Output")]
    pub console: bool,
}

pub struct Common<'a, H: Host> {
    pub config: Config,
    host: &'a mut H,
}

impl<'a, H: Host> Common<'a, H> {
    /// Set up logging and load the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded
    pub fn new(host: &'a mut H, args: &CommonArgs) -> Result<Self> {
        init_logging(args.log_level);
        let config = Config::load(Utf8Path::new("."), args.config.as_ref())?;
        Ok(Self { config, host })
    }

    /// Load the documents named by `args`, keeping those that match its filter
    ///
    /// # Errors
    ///
    /// Returns an error if the document file cannot be read or holds something other than objects
    pub fn load_documents(&self, args: &DocumentArgs) -> Result<Vec<Document>> {
        let source = JsonFileSource::load(&args.documents)?.with_identity_labels(self.config.identity_labels.iter().cloned());
        let filter: LabelFilter = args.filter.iter().cloned().collect();
        let documents = source.documents(&filter)?;
        check_documents(&documents)?;
        Ok(documents)
    }

    /// Emit `tables` and `measurements` to every requested output
    ///
    /// # Errors
    ///
    /// Returns an error if a report file cannot be written
    pub fn report(&mut self, args: &ReportArgs, tables: &[ReportTable], measurements: &[MeasurementInfo]) -> Result<()> {
        let generating_reports = args.csv.is_some() || args.json.is_some();

        if args.console || !generating_reports {
            let use_colors = match args.color {
                ColorMode::Always => true,
                ColorMode::Never => false,
                ColorMode::Auto => {
                    use std::io::{IsTerminal, stdout};
                    stdout().is_terminal()
                }
            };

            let mut console_output = String::new();
            generate_console(tables, measurements, use_colors, &mut console_output)?;
            let _ = write!(self.host.output(), "{console_output}");
        }

        if let Some(dir) = &args.csv {
            fs::create_dir_all(dir).into_app_err_with(|| format!("creating CSV output directory '{dir}'"))?;
            for table in tables {
                let filename = dir.join(format!("{}.csv", file_stem(&table.name)));
                let mut csv_output = String::new();
                generate_csv(&table.table, &mut csv_output)?;
                fs::write(&filename, csv_output).into_app_err_with(|| format!("writing '{filename}'"))?;
                info!(target: LOG_TARGET, "wrote table '{}' to '{filename}'", table.name);
            }
        }

        if let Some(filename) = &args.json {
            let mut json_output = String::new();
            generate_json(tables, measurements, &mut json_output)?;
            fs::write(filename, json_output).into_app_err_with(|| format!("writing '{filename}'"))?;
            info!(target: LOG_TARGET, "wrote {} tables to '{filename}'", tables.len());
        }

        Ok(())
    }
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // a logger may already be installed when commands run more than once in a process
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// A table name made safe to use as a file name.
fn file_stem(name: &str) -> String {
    name.chars().map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("cpu_usage"), "cpu_usage");
        assert_eq!(file_stem("net/rx:bytes"), "net_rx_bytes");
    }
}
