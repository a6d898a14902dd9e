use crate::Result;
use crate::documents::DEFAULT_IDENTITY_LABELS;
use crate::extract::{MEASUREMENT_COLUMN, VALUE_COLUMN};
use crate::table::{ColumnDef, ExtractorMap, GroupingPolicy, TableDef, resolve_extractors, suggest};
use camino::{Utf8Path, Utf8PathBuf};
use compact_str::CompactString;
use ohno::{IntoAppError, app_err, bail};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// The configuration file looked for when none is given explicitly
pub const CONFIG_FILE_NAME: &str = "docframe.toml";

const DEFAULT_SERIES_LABELS: &[&str] = &["commit_date", "commit_count", "test_name"];

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Grouping policy for tables that declare unique columns and don't pick their own
    #[serde(default)]
    pub grouping: GroupingPolicy,

    /// Labels that together identify one logical test run; an empty list keeps every document
    #[serde(default = "default_identity_labels")]
    pub identity_labels: Vec<CompactString>,

    /// Labels carried by every generated per-measurement table
    #[serde(default = "default_series_labels")]
    pub series_labels: Vec<CompactString>,

    /// Extractors that table columns can refer to by name
    #[serde(default)]
    pub extractors: BTreeMap<CompactString, ColumnDef>,

    #[serde(default)]
    pub tables: Vec<TableDef>,
}

fn default_identity_labels() -> Vec<CompactString> {
    DEFAULT_IDENTITY_LABELS.iter().map(|l| CompactString::from(*l)).collect()
}

fn default_series_labels() -> Vec<CompactString> {
    DEFAULT_SERIES_LABELS.iter().map(|l| CompactString::from(*l)).collect()
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it does not validate
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading docframe configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading docframe configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate().map_err(|e| app_err!("invalid configuration file '{final_path}': {e}"))?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Resolve the named extractors.
    ///
    /// # Errors
    ///
    /// Returns an error if a named extractor is malformed
    pub fn extractor_map(&self) -> Result<ExtractorMap> {
        resolve_extractors(&self.extractors)
    }

    /// Find a table definition by name.
    ///
    /// # Errors
    ///
    /// Returns an error, with a suggestion when one is close, if there is no such table
    pub fn table(&self, name: &str) -> Result<&TableDef> {
        if let Some(def) = self.tables.iter().find(|t| t.name == name) {
            return Ok(def);
        }

        match suggest(name, self.tables.iter().map(|t| t.name.as_str())) {
            Some(s) => bail!("unknown table '{name}', did you mean '{s}'?"),
            None => bail!("unknown table '{name}'"),
        }
    }

    /// The grouping policy that applies to `def`, given an optional command-line override.
    #[must_use]
    pub fn grouping_for(&self, def: &TableDef, requested: Option<GroupingPolicy>) -> GroupingPolicy {
        requested.or(def.grouping).unwrap_or(self.grouping)
    }

    /// Check that every table resolves against the named extractors
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> Result<()> {
        let named = self.extractor_map()?;

        let mut names = HashSet::new();
        for def in &self.tables {
            if !names.insert(def.name.as_str()) {
                bail!("table '{}' is defined more than once", def.name);
            }
            let _ = def.resolve(&named)?;
        }

        if let Some(label) = self.series_labels.iter().find(|l| l.as_str() == MEASUREMENT_COLUMN || l.as_str() == VALUE_COLUMN) {
            bail!("series label '{label}' clashes with a generated column name");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
