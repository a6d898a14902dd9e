use super::{RowExtractor, ValueExtractor};
use compact_str::CompactString;

/// Name of the generated column carrying the aggregation's display name.
pub const MEASUREMENT_COLUMN: &str = "measurement";

/// Name of the generated column carrying the aggregated number.
pub const VALUE_COLUMN: &str = "value";

/// An aggregation to generate a row extractor for.
///
/// A bare id uses the id as its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRef {
    pub id: CompactString,
    pub display_name: CompactString,
}

impl From<&str> for AggregationRef {
    fn from(id: &str) -> Self {
        Self {
            id: id.into(),
            display_name: id.into(),
        }
    }
}

impl From<(&str, &str)> for AggregationRef {
    fn from((id, display_name): (&str, &str)) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Build one row extractor per aggregation of `measurement`.
///
/// Each row carries the requested labels, the aggregation's display name in the
/// [`MEASUREMENT_COLUMN`], the aggregated number in the [`VALUE_COLUMN`], and then `extra`
/// verbatim. Documents lacking any label or the aggregation contribute no row.
#[must_use]
pub fn generate_extractors<A>(labels: &[&str], measurement: &str, aggregations: &[A], extra: &[ValueExtractor]) -> Vec<RowExtractor>
where
    A: Clone + Into<AggregationRef>,
{
    aggregations
        .iter()
        .cloned()
        .map(|aggregation| {
            let aggregation = aggregation.into();

            let mut columns: Vec<_> = labels.iter().map(|label| ValueExtractor::label(*label, label)).collect();
            columns.push(ValueExtractor::constant(MEASUREMENT_COLUMN, aggregation.display_name));
            columns.push(ValueExtractor::measurement(VALUE_COLUMN, measurement, &aggregation.id));
            columns.extend(extra.iter().cloned());

            RowExtractor::new(false, columns)
        })
        .collect()
}

/// Column names matching the rows produced by [`generate_extractors`].
#[must_use]
pub fn generated_columns(labels: &[&str], extra: &[ValueExtractor]) -> Vec<CompactString> {
    labels
        .iter()
        .map(|l| CompactString::from(*l))
        .chain([MEASUREMENT_COLUMN.into(), VALUE_COLUMN.into()])
        .chain(extra.iter().map(|e| CompactString::from(e.name())))
        .collect()
}
