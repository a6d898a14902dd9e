use super::{CellValue, PathQuery};
use crate::Result;
use crate::documents::Document;
use compact_str::CompactString;

/// Pulls one cell out of one document.
///
/// Every extractor is fully compiled when it is constructed, so extraction is a pure function
/// of the document and extractors can be shared freely between threads.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExtractor {
    /// Always yields `value`.
    Const { value: CellValue, name: CompactString },

    /// Yields the value found at `query`, if any.
    Path { query: PathQuery, name: CompactString },

    /// Yields the first non-null result of `extractors`, evaluated in order.
    OrElse { extractors: Vec<Self>, name: CompactString },

    /// Coerces the result of `inner` to a boolean, using `none_value` when `inner` yields nothing.
    BoolCoerce { inner: Box<Self>, none_value: bool },
}

impl ValueExtractor {
    #[must_use]
    pub fn constant(name: impl Into<CompactString>, value: impl Into<CellValue>) -> Self {
        Self::Const {
            value: value.into(),
            name: name.into(),
        }
    }

    /// Build a path extractor, compiling the query up front.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a valid query.
    pub fn path(name: impl Into<CompactString>, path: &str) -> Result<Self> {
        Ok(Self::Path {
            query: PathQuery::compile(path)?,
            name: name.into(),
        })
    }

    /// Extract the value of a document label.
    #[must_use]
    pub fn label(name: impl Into<CompactString>, label: &str) -> Self {
        Self::Path {
            query: PathQuery::label(label),
            name: name.into(),
        }
    }

    /// Extract one aggregation of one measurement.
    #[must_use]
    pub fn measurement(name: impl Into<CompactString>, measurement: &str, aggregation: &str) -> Self {
        Self::Path {
            query: PathQuery::measurement(measurement, aggregation),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn or_else(name: impl Into<CompactString>, extractors: Vec<Self>) -> Self {
        Self::OrElse {
            extractors,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn boolean(inner: Self, none_value: bool) -> Self {
        Self::BoolCoerce {
            inner: Box::new(inner),
            none_value,
        }
    }

    /// The column name this extractor produces.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Const { name, .. } | Self::Path { name, .. } | Self::OrElse { name, .. } => name,
            Self::BoolCoerce { inner, .. } => inner.name(),
        }
    }

    #[must_use]
    pub fn extract(&self, document: &Document) -> Option<CellValue> {
        match self {
            Self::Const { value, .. } => Some(value.clone()),
            Self::Path { query, .. } => query.search(document).and_then(|v| CellValue::from_json(&v)),
            Self::OrElse { extractors, .. } => extractors.iter().find_map(|e| e.extract(document)),
            Self::BoolCoerce { inner, none_value } => {
                Some(CellValue::Boolean(inner.extract(document).map_or(*none_value, |v| v.truthy())))
            }
        }
    }
}
