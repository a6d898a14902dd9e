use super::Document;
use compact_str::CompactString;
use core::fmt;
use core::str::FromStr;
use serde_json::Value;
use std::collections::BTreeMap;

/// The label list of a document: `metadata.labels = [{name, value}, ...]`.
pub fn labels(document: &Document) -> impl Iterator<Item = (&str, &Value)> {
    document
        .pointer("/metadata/labels")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|label| Some((label.get("name")?.as_str()?, label.get("value")?)))
}

/// The value of the first label called `name`, if it is present and not null.
#[must_use]
pub fn label_value<'a>(document: &'a Document, name: &str) -> Option<&'a Value> {
    labels(document).find(|(n, _)| *n == name).map(|(_, v)| v).filter(|v| !v.is_null())
}

/// Text form of a label value: strings as-is, anything else as JSON.
#[must_use]
pub fn label_text(value: &Value) -> CompactString {
    value.as_str().map_or_else(|| CompactString::from(value.to_string()), CompactString::from)
}

/// A `name=value` pair given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPair {
    pub name: CompactString,
    pub value: CompactString,
}

impl FromStr for LabelPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        let (name, value) = s.split_once('=').ok_or_else(|| format!("expected 'name=value', got '{s}'"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("missing label name in '{s}'"));
        }

        Ok(Self {
            name: name.into(),
            value: value.trim().into(),
        })
    }
}

impl fmt::Display for LabelPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Selects documents by label: a document matches when it carries every listed label with the
/// listed value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelFilter {
    labels: BTreeMap<CompactString, CompactString>,
}

impl LabelFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require label `name` to equal `value`, replacing any earlier requirement on `name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<CompactString>, value: impl Into<CompactString>) -> Self {
        let _ = self.labels.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.labels
            .iter()
            .all(|(name, value)| labels(document).any(|(n, v)| *name == n && label_text(v) == *value))
    }
}

impl FromIterator<LabelPair> for LabelFilter {
    fn from_iter<T: IntoIterator<Item = LabelPair>>(iter: T) -> Self {
        iter.into_iter().fold(Self::new(), |filter, pair| filter.with(pair.name, pair.value))
    }
}

impl fmt::Display for LabelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}
