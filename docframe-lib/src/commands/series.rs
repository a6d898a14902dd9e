use super::Host;
use super::common::{Common, CommonArgs, DocumentArgs, ReportArgs};
use crate::Result;
use crate::extract::{AggregationRef, MEASUREMENT_COLUMN, generate_extractors, generated_columns};
use crate::measurements::{MeasurementInfo, consolidate_measurements};
use crate::reports::ReportTable;
use crate::table::{GroupingPolicy, TableSpec, build_grouped_table};
use clap::Parser;
use compact_str::CompactString;
use log::debug;
use ohno::app_err;

const LOG_TARGET: &str = "    series";

#[derive(Parser, Debug)]
pub struct SeriesArgs {
    /// Label to carry in every table (default is `series_labels` from the configuration, can be repeated)
    #[arg(long = "label", short = 'l', value_name = "NAME")]
    pub labels: Vec<CompactString>,

    /// How to collapse rows for the same labels and aggregation, overriding the configuration
    #[arg(long, value_name = "POLICY")]
    pub grouping: Option<GroupingPolicy>,

    /// Fill the measurement column with aggregation names instead of aggregation ids
    #[arg(long)]
    pub aggregation_names: bool,

    #[command(flatten)]
    pub documents: DocumentArgs,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// The spec of the table holding every aggregation of `measurement`, one row per aggregation and
/// document, unique on the labels plus the measurement column.
fn series_spec(labels: &[&str], measurement: &MeasurementInfo, aggregation_names: bool) -> Result<TableSpec> {
    let aggregations: Vec<AggregationRef> = measurement
        .aggregations
        .iter()
        .map(|a| AggregationRef {
            id: a.id.clone(),
            display_name: if aggregation_names { a.name.clone() } else { a.id.clone() },
        })
        .collect();

    let extractors = generate_extractors(labels, &measurement.id, &aggregations, &[]);
    let unique = labels.iter().copied().chain([MEASUREMENT_COLUMN]);

    TableSpec::new(generated_columns(labels, &[]), extractors)?.with_unique_keys(unique)
}

pub fn process_series<H: Host>(host: &mut H, args: &SeriesArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common)?;

    let labels: Vec<&str> = if args.labels.is_empty() {
        common.config.series_labels.iter().map(CompactString::as_str).collect()
    } else {
        args.labels.iter().map(CompactString::as_str).collect()
    };
    let policy = args.grouping.unwrap_or(common.config.grouping);

    let documents = common.load_documents(&args.documents)?;
    let measurements = consolidate_measurements(&documents);

    let mut tables = Vec::with_capacity(measurements.len());
    for measurement in &measurements {
        let spec = series_spec(&labels, measurement, args.aggregation_names)
            .map_err(|e| app_err!("measurement '{}': {e}", measurement.id))?;
        let table = build_grouped_table(&documents, &spec, policy).map_err(|e| app_err!("measurement '{}': {e}", measurement.id))?;

        debug!(target: LOG_TARGET, "measurement '{}' has {} rows", measurement.id, table.row_count());
        tables.push(ReportTable::new(measurement.id.clone(), table));
    }

    common.report(&args.report, &tables, &measurements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurements::AggregationInfo;
    use crate::table::build_table;
    use serde_json::json;

    fn cpu() -> MeasurementInfo {
        MeasurementInfo {
            id: "cpu".into(),
            name: "cpu".into(),
            description: None,
            unit: None,
            bigger_is_better: false,
            aggregations: vec![
                AggregationInfo::bare("max"),
                AggregationInfo {
                    id: "mean".into(),
                    name: "average".into(),
                    description: None,
                },
            ],
        }
    }

    #[test]
    fn test_series_spec_shape() {
        let spec = series_spec(&["test_name"], &cpu(), false).unwrap();
        assert_eq!(spec.columns(), ["test_name", "measurement", "value"]);
        assert_eq!(spec.unique_keys(), ["test_name", "measurement"]);
        assert_eq!(spec.extractors().len(), 2);
    }

    #[test]
    fn test_series_spec_rejects_clashing_label() {
        assert!(series_spec(&["value"], &cpu(), false).is_err());
    }

    #[test]
    fn test_aggregation_names() {
        let doc = json!({
            "metadata": {"labels": [{"name": "test_name", "value": "t"}]},
            "results": {"measurements": {"cpu": {"max": 4, "mean": 2.5}}}
        });

        let by_id = build_table(core::slice::from_ref(&doc), &series_spec(&["test_name"], &cpu(), false).unwrap());
        let ids: Vec<_> = by_id.column("measurement").unwrap().iter().map(|c| c.as_ref().unwrap().to_string()).collect();
        assert_eq!(ids, ["max", "mean"]);

        let by_name = build_table(&[doc], &series_spec(&["test_name"], &cpu(), true).unwrap());
        let names: Vec<_> = by_name.column("measurement").unwrap().iter().map(|c| c.as_ref().unwrap().to_string()).collect();
        assert_eq!(names, ["max", "average"]);
    }
}
