use compact_str::{CompactString, format_compact};
use serde::Serialize;

/// A summary statistic reported for a measurement.
///
/// Two aggregations are equal only when their id, name and description all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AggregationInfo {
    pub id: CompactString,
    pub name: CompactString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<CompactString>,
}

impl AggregationInfo {
    /// An aggregation with no metadata, named after its id.
    #[must_use]
    pub fn bare(id: impl Into<CompactString>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: None,
        }
    }
}

/// Canonical description of one measurement found in a document collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementInfo {
    pub id: CompactString,
    pub name: CompactString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<CompactString>,
    pub bigger_is_better: bool,

    /// Sorted by id.
    pub aggregations: Vec<AggregationInfo>,
}

impl MeasurementInfo {
    /// A one-line human description: the declared description, else the name with its unit.
    #[must_use]
    pub fn summary(&self) -> CompactString {
        match (&self.description, &self.unit) {
            (Some(description), _) => description.clone(),
            (None, Some(unit)) => format_compact!("{} in ({unit})", self.name),
            (None, None) => self.name.clone(),
        }
    }

    /// Aggregation ids, in order.
    pub fn aggregation_ids(&self) -> impl Iterator<Item = &str> {
        self.aggregations.iter().map(|a| a.id.as_str())
    }
}
