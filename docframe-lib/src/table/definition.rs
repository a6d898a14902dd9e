//! Declarative table definitions, as written in configuration files.

use super::lookup::suggest;
use super::{ColumnType, GroupingPolicy, SortKey, TableSpec};
use crate::Result;
use crate::extract::{CellValue, RowExtractor, ValueExtractor};
use compact_str::CompactString;
use ohno::{app_err, bail};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Named value extractors that table columns may refer to.
pub type ExtractorMap = BTreeMap<CompactString, ValueExtractor>;

/// One table, as declared in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableDef {
    pub name: CompactString,
    pub columns: Vec<CompactString>,

    /// Each entry can turn a document into one row.
    pub extractors: Vec<RowDef>,

    #[serde(default)]
    pub column_types: BTreeMap<CompactString, ColumnType>,

    /// Column names, prefixed with `-` for descending order.
    #[serde(default)]
    pub sort: Vec<CompactString>,

    #[serde(default)]
    pub unique_columns: Vec<CompactString>,

    /// Overrides the configured grouping policy for this table.
    #[serde(default)]
    pub grouping: Option<GroupingPolicy>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowDef {
    #[serde(default)]
    pub accepts_null: bool,
    pub columns: Vec<ColumnDef>,
}

/// One value extractor, as declared in configuration.
///
/// The kind of extractor is decided by which key is present: `path`, `value`, `label` or
/// `any_of`. An entry with none of them refers to a named extractor by its `name`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDef {
    #[serde(default)]
    pub name: Option<CompactString>,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub value: Option<serde_json::Value>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub any_of: Option<Vec<Self>>,

    #[serde(default)]
    pub as_bool: bool,

    #[serde(default)]
    pub none_value: Option<bool>,
}

impl ColumnDef {
    /// Build the extractor this entry describes.
    ///
    /// `default_name` is used when the entry carries no name of its own. References are looked up
    /// in `named`; pass `None` where references are not allowed.
    fn resolve(&self, default_name: &str, named: Option<&ExtractorMap>) -> Result<ValueExtractor> {
        let name = self.name.as_deref().unwrap_or(default_name);

        let kinds = [self.path.is_some(), self.value.is_some(), self.label.is_some(), self.any_of.is_some()];
        if kinds.iter().filter(|k| **k).count() > 1 {
            bail!("column '{name}' must have only one of 'path', 'value', 'label' or 'any_of'");
        }

        if self.none_value.is_some() && !self.as_bool {
            bail!("column '{name}' sets 'none_value' without 'as_bool'");
        }

        let extractor = if let Some(path) = &self.path {
            ValueExtractor::path(name, path).map_err(|e| app_err!("column '{name}': {e}"))?
        } else if let Some(value) = &self.value {
            let value = CellValue::from_json(value).ok_or_else(|| app_err!("column '{name}' has an empty 'value'"))?;
            ValueExtractor::constant(name, value)
        } else if let Some(label) = &self.label {
            ValueExtractor::label(name, label)
        } else if let Some(alternatives) = &self.any_of {
            if alternatives.is_empty() {
                bail!("column '{name}' has an empty 'any_of'");
            }

            let extractors = alternatives
                .iter()
                .map(|def| def.resolve(name, named))
                .collect::<Result<Vec<_>>>()?;
            ValueExtractor::or_else(name, extractors)
        } else {
            let Some(named) = named else {
                bail!("column '{name}' must have one of 'path', 'value', 'label' or 'any_of'");
            };

            let Some(reference) = self.name.as_deref() else {
                bail!("a column inside '{default_name}' has no 'name', 'path', 'value', 'label' or 'any_of'");
            };

            named
                .get(reference)
                .cloned()
                .ok_or_else(|| match suggest(reference, named.keys().map(CompactString::as_str)) {
                    Some(s) => app_err!("column '{reference}' refers to an unknown extractor, did you mean '{s}'?"),
                    None => app_err!("column '{reference}' refers to an unknown extractor"),
                })?
        };

        Ok(if self.as_bool {
            ValueExtractor::boolean(extractor, self.none_value.unwrap_or(false))
        } else {
            extractor
        })
    }
}

/// Build the named extractors declared in configuration.
///
/// Each extractor takes its key as its name. Named extractors cannot refer to one another.
///
/// # Errors
///
/// Returns an error if an entry is malformed.
pub fn resolve_extractors(defs: &BTreeMap<CompactString, ColumnDef>) -> Result<ExtractorMap> {
    defs.iter()
        .map(|(key, def)| {
            let extractor = def.resolve(key, None).map_err(|e| app_err!("extractor '{key}': {e}"))?;
            Ok((key.clone(), extractor))
        })
        .collect()
}

impl TableDef {
    /// Turn this definition into a validated [`TableSpec`], resolving column references against `named`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the table if any part of the definition is inconsistent.
    pub fn resolve(&self, named: &ExtractorMap) -> Result<TableSpec> {
        self.try_resolve(named).map_err(|e| app_err!("table '{}': {e}", self.name))
    }

    fn try_resolve(&self, named: &ExtractorMap) -> Result<TableSpec> {
        let extractors = self
            .extractors
            .iter()
            .map(|row| {
                let columns = row
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(i, def)| {
                        let default_name = self.columns.get(i).map_or("", CompactString::as_str);
                        def.resolve(default_name, Some(named))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(RowExtractor::new(row.accepts_null, columns))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut spec = TableSpec::new(self.columns.iter().cloned(), extractors)?;

        for (column, column_type) in &self.column_types {
            spec = spec.with_column_type(column, *column_type)?;
        }

        if !self.sort.is_empty() {
            let keys = self.sort.iter().map(|k| k.parse()).collect::<Result<Vec<SortKey>>>()?;
            spec = spec.with_sort(keys)?;
        }

        if !self.unique_columns.is_empty() {
            spec = spec.with_unique_keys(self.unique_columns.iter().cloned())?;
        }

        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::build_table;
    use serde_json::json;

    fn named() -> ExtractorMap {
        let defs: BTreeMap<CompactString, ColumnDef> = toml::from_str(
            r#"
            [commit_sha]
            label = "commit_sha"

            [is_default_branch]
            label = "is_default_branch"
            as_bool = true
            "#,
        )
        .unwrap();
        resolve_extractors(&defs).unwrap()
    }

    fn parse(text: &str) -> TableDef {
        toml::from_str(text).unwrap()
    }

    fn document() -> serde_json::Value {
        json!({
            "metadata": {"labels": [
                {"name": "commit_sha", "value": "abc"},
                {"name": "commit_date", "value": "2024-01-02 10:00:00"},
                {"name": "is_default_branch", "value": "no"}
            ]},
            "results": {"measurements": {"latency": {"p50": 12, "p99": 40}}},
            "context": {"run": {"endTimestamp": "2024-01-02T11:00:00Z"}}
        })
    }

    const TABLE: &str = r#"
        name = "latency"
        columns = ["commit_sha", "commit_date", "default_branch", "kind", "value", "finished"]
        column_types = { commit_date = "datetime", value = "float" }
        sort = ["-commit_date", "kind"]
        unique_columns = ["commit_sha", "kind"]

        [[extractors]]
        columns = [
            { name = "commit_sha" },
            { name = "commit_date", label = "commit_date" },
            { name = "default_branch", label = "is_default_branch", as_bool = true, none_value = true },
            { name = "kind", value = "p50" },
            { name = "value", path = "results.measurements.latency.p50" },
            { name = "finished", any_of = [{ path = "context.run.endTimestamp" }, { path = "context.argo.startTimestamp" }] },
        ]

        [[extractors]]
        accepts_null = true
        columns = [
            { name = "commit_sha" },
            { label = "commit_date" },
            { name = "is_default_branch" },
            { value = "p99" },
            { path = "results.measurements.latency.p99" },
            { path = "context.missing" },
        ]
    "#;

    #[test]
    fn test_resolve_and_build() {
        let spec = parse(TABLE).resolve(&named()).unwrap();
        assert_eq!(spec.extractors().len(), 2);
        assert_eq!(spec.unique_keys(), ["commit_sha", "kind"]);
        assert_eq!(spec.sort().len(), 2);

        let table = build_table(&[document()], &spec);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), Some(&CellValue::from("abc")));
        assert!(matches!(table.cell(0, 1), Some(CellValue::DateTime(_))));
        assert_eq!(table.cell(0, 2), Some(&CellValue::Boolean(false)));
        assert_eq!(table.cell(0, 3), Some(&CellValue::from("p50")));
        assert_eq!(table.cell(0, 4), Some(&CellValue::Float(12.0)));
        assert_eq!(table.cell(0, 5), Some(&CellValue::from("2024-01-02T11:00:00Z")));
        assert_eq!(table.cell(1, 3), Some(&CellValue::from("p99")));
        assert_eq!(table.cell(1, 5), None);
    }

    #[test]
    fn test_reference_takes_referenced_name() {
        let spec = parse(TABLE).resolve(&named()).unwrap();
        assert_eq!(spec.extractors()[1].columns()[2].name(), "is_default_branch");
        assert_eq!(spec.extractors()[1].columns()[1].name(), "commit_date");
    }

    #[test]
    fn test_unknown_reference() {
        let table = parse(
            r#"
            name = "t"
            columns = ["sha"]
            [[extractors]]
            columns = [{ name = "commit_sh" }]
            "#,
        );

        let err = table.resolve(&named()).unwrap_err().to_string();
        assert!(err.contains("table 't'"));
        assert!(err.contains("did you mean 'commit_sha'?"));
    }

    #[test]
    fn test_width_mismatch() {
        let table = parse(
            r#"
            name = "t"
            columns = ["sha", "value"]
            [[extractors]]
            columns = [{ name = "commit_sha" }]
            "#,
        );
        assert!(table.resolve(&named()).is_err());
    }

    #[test]
    fn test_conflicting_kinds() {
        let table = parse(
            r#"
            name = "t"
            columns = ["x"]
            [[extractors]]
            columns = [{ name = "x", path = "a.b", label = "b" }]
            "#,
        );
        let err = table.resolve(&named()).unwrap_err().to_string();
        assert!(err.contains("only one of"));
    }

    #[test]
    fn test_none_value_requires_as_bool() {
        let table = parse(
            r#"
            name = "t"
            columns = ["x"]
            [[extractors]]
            columns = [{ name = "x", label = "b", none_value = true }]
            "#,
        );
        assert!(table.resolve(&named()).is_err());
    }

    #[test]
    fn test_bad_path() {
        let table = parse(
            r#"
            name = "t"
            columns = ["x"]
            [[extractors]]
            columns = [{ name = "x", path = "a[?" }]
            "#,
        );
        assert!(table.resolve(&named()).is_err());
    }

    #[test]
    fn test_unknown_sort_and_type_columns() {
        let base = r#"
            name = "t"
            columns = ["x"]
            [[extractors]]
            columns = [{ name = "x", path = "a" }]
        "#;

        let mut table = parse(base);
        table.sort = vec!["-y".into()];
        assert!(table.resolve(&named()).is_err());

        let mut table = parse(base);
        let _ = table.column_types.insert("y".into(), ColumnType::Int);
        assert!(table.resolve(&named()).is_err());

        let mut table = parse(base);
        table.unique_columns = vec!["y".into()];
        assert!(table.resolve(&named()).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: core::result::Result<TableDef, _> = toml::from_str(
            r#"
            name = "t"
            columns = ["x"]
            extractors = []
            colour = "red"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_named_extractors_cannot_reference() {
        let defs: BTreeMap<CompactString, ColumnDef> = toml::from_str(
            r#"
            [alias]
            name = "commit_sha"
            "#,
        )
        .unwrap();
        assert!(resolve_extractors(&defs).is_err());
    }

    #[test]
    fn test_named_extractor_name_is_key() {
        let map = named();
        assert_eq!(map["commit_sha"].name(), "commit_sha");
        assert_eq!(map["is_default_branch"].extract(&document()), Some(CellValue::Boolean(false)));
    }
}
