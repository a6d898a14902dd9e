use super::{Document, LabelFilter, label_text, label_value};
use crate::Result;
use crate::extract::CellValue;
use crate::table::ColumnType;
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use log::{debug, info};
use ohno::{IntoAppError, bail};
use std::collections::HashSet;
use std::fs;

const LOG_TARGET: &str = "    source";

/// Labels that together identify one logical test run.
pub const DEFAULT_IDENTITY_LABELS: &[&str] = &[
    "commit_sha",
    "runner",
    "workflowName",
    "templateName",
    "platform",
    "test_name",
    "environment",
];

/// Placeholder used in an identity for a missing label.
const MISSING_LABEL: &str = "-";

/// Supplies documents selected by label.
pub trait DocumentSource {
    /// Documents matching `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    fn documents(&self, filter: &LabelFilter) -> Result<Vec<Document>>;
}

/// Documents held in memory, typically loaded from a JSON or newline-delimited JSON file.
///
/// When a logical test run was recorded more than once, only its most recently updated document
/// is returned.
#[derive(Debug, Clone, Default)]
pub struct JsonFileSource {
    documents: Vec<Document>,
    identity_labels: Vec<CompactString>,
}

impl JsonFileSource {
    #[must_use]
    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self {
            documents,
            identity_labels: DEFAULT_IDENTITY_LABELS.iter().map(|l| CompactString::from(*l)).collect(),
        }
    }

    /// Parse a JSON array of documents, or a stream of documents such as newline-delimited JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON.
    pub fn parse(text: &str) -> Result<Self> {
        let documents = if text.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<Document>>(text).into_app_err("parsing document array")?
        } else {
            serde_json::Deserializer::from_str(text)
                .into_iter::<Document>()
                .collect::<core::result::Result<Vec<_>, _>>()
                .into_app_err("parsing document stream")?
        };

        Ok(Self::from_documents(documents))
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold valid JSON.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading documents from '{path}'"))?;
        let source = Self::parse(&text).map_err(|e| ohno::app_err!("'{path}': {e}"))?;

        info!(target: LOG_TARGET, "loaded {} documents from '{path}'", source.documents.len());
        Ok(source)
    }

    /// Replace the labels that identify a logical test run. An empty list disables deduplication.
    #[must_use]
    pub fn with_identity_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.identity_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn identity(&self, document: &Document) -> Vec<CompactString> {
        self.identity_labels
            .iter()
            .map(|l| label_value(document, l).map_or_else(|| MISSING_LABEL.into(), label_text))
            .collect()
    }
}

fn time_updated(document: &Document) -> Option<DateTime<Utc>> {
    let value = CellValue::from_json(document.pointer("/metadata/timeUpdated")?)?;
    match ColumnType::DateTime.coerce(&value)? {
        CellValue::DateTime(dt) => Some(dt),
        _ => None,
    }
}

impl DocumentSource for JsonFileSource {
    fn documents(&self, filter: &LabelFilter) -> Result<Vec<Document>> {
        let mut matching: Vec<(Option<DateTime<Utc>>, &Document)> = self
            .documents
            .iter()
            .filter(|d| filter.matches(d))
            .map(|d| (time_updated(d), d))
            .collect();

        if matching.is_empty() && !self.documents.is_empty() && !filter.is_empty() {
            debug!(target: LOG_TARGET, "no document matches filter {filter}");
        }

        // most recent first, undated last
        matching.sort_by(|a, b| b.0.cmp(&a.0));

        let mut seen = HashSet::new();
        let mut result: Vec<Document> = Vec::with_capacity(matching.len());
        for (_, document) in matching {
            if self.identity_labels.is_empty() || seen.insert(self.identity(document)) {
                result.push(document.clone());
            }
        }

        if result.len() < self.documents.len() {
            debug!(
                target: LOG_TARGET,
                "selected {} of {} documents after filtering and removing repeated runs",
                result.len(),
                self.documents.len()
            );
        }

        result.reverse();
        Ok(result)
    }
}

/// Check that every document is a JSON object.
///
/// # Errors
///
/// Returns an error naming the first document that is not.
pub fn check_documents(documents: &[Document]) -> Result<()> {
    if let Some(position) = documents.iter().position(|d| !d.is_object()) {
        bail!("document {position} is not a JSON object");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(test_name: &str, sha: &str, updated: &str, value: i64) -> Document {
        json!({
            "metadata": {
                "timeUpdated": updated,
                "labels": [
                    {"name": "test_name", "value": test_name},
                    {"name": "commit_sha", "value": sha}
                ]
            },
            "value": value
        })
    }

    fn values(documents: &[Document]) -> Vec<i64> {
        documents.iter().map(|d| d["value"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_keeps_latest_run_in_chronological_order() {
        let source = JsonFileSource::from_documents(vec![
            run("a", "sha1", "2024-01-01T00:00:00Z", 1),
            run("b", "sha1", "2024-01-03T00:00:00Z", 2),
            run("a", "sha1", "2024-01-05T00:00:00Z", 3),
            run("a", "sha2", "2024-01-04T00:00:00Z", 4),
        ]);

        let documents = source.documents(&LabelFilter::new()).unwrap();
        assert_eq!(values(&documents), [2, 4, 3]);
    }

    #[test]
    fn test_filter_applies_before_dedup() {
        let source = JsonFileSource::from_documents(vec![
            run("a", "sha1", "2024-01-01T00:00:00Z", 1),
            run("b", "sha1", "2024-01-03T00:00:00Z", 2),
        ]);

        let documents = source.documents(&LabelFilter::new().with("test_name", "a")).unwrap();
        assert_eq!(values(&documents), [1]);
    }

    #[test]
    fn test_custom_identity_labels() {
        let source = JsonFileSource::from_documents(vec![
            run("a", "sha1", "2024-01-01T00:00:00Z", 1),
            run("b", "sha1", "2024-01-03T00:00:00Z", 2),
            run("a", "sha2", "2024-01-02T00:00:00Z", 3),
        ])
        .with_identity_labels(["commit_sha"]);

        assert_eq!(values(&source.documents(&LabelFilter::new()).unwrap()), [3, 2]);

        let source = source.with_identity_labels(Vec::<CompactString>::new());
        assert_eq!(values(&source.documents(&LabelFilter::new()).unwrap()), [1, 3, 2]);
    }

    #[test]
    fn test_missing_labels_share_placeholder() {
        let source = JsonFileSource::from_documents(vec![
            json!({"metadata": {"timeUpdated": "2024-01-01"}, "value": 1}),
            json!({"metadata": {"timeUpdated": "2024-01-02"}, "value": 2}),
        ]);
        assert_eq!(values(&source.documents(&LabelFilter::new()).unwrap()), [2]);
    }

    #[test]
    fn test_undated_documents_come_first() {
        let source = JsonFileSource::from_documents(vec![
            run("a", "sha1", "2024-01-01T00:00:00Z", 1),
            json!({"metadata": {"labels": [{"name": "test_name", "value": "b"}]}, "value": 2}),
        ]);
        assert_eq!(values(&source.documents(&LabelFilter::new()).unwrap()), [2, 1]);
    }

    #[test]
    fn test_parse_array_and_stream() {
        let array = JsonFileSource::parse(r#"[{"a": 1}, {"a": 2}]"#).unwrap();
        assert_eq!(array.len(), 2);

        let stream = JsonFileSource::parse("{\"a\": 1}\n{\"a\": 2}\n\n{\"a\": 3}\n").unwrap();
        assert_eq!(stream.len(), 3);

        assert!(JsonFileSource::parse("").unwrap().is_empty());
        assert!(JsonFileSource::parse("{\"a\": ").is_err());
        assert!(JsonFileSource::parse("[1, ").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("docs.json")).unwrap();
        fs::write(&path, r#"[{"metadata": {"labels": []}}]"#).unwrap();

        assert_eq!(JsonFileSource::load(&path).unwrap().len(), 1);
        assert!(JsonFileSource::load(&path.with_file_name("missing.json")).is_err());
    }

    #[test]
    fn test_check_documents() {
        check_documents(&[json!({}), json!({"a": 1})]).unwrap();
        assert!(check_documents(&[json!({}), json!([1])]).is_err());
    }
}
