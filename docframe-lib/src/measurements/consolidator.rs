use super::{AggregationInfo, MeasurementInfo};
use crate::documents::Document;
use compact_str::CompactString;
use log::debug;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

const LOG_TARGET: &str = "  measures";

const MEASUREMENTS_PATH: [&str; 2] = ["results", "measurements"];
const METADATA_PATH: [&str; 3] = ["results", "_meta", "measurements"];

#[derive(Debug, Default)]
struct AggregationMetadata {
    name: Option<CompactString>,
    description: Option<CompactString>,
}

#[derive(Debug, Default)]
struct MeasurementMetadata {
    name: Option<CompactString>,
    description: Option<CompactString>,
    unit: Option<CompactString>,
    bigger_is_better: Option<bool>,
    aggregations: BTreeMap<CompactString, AggregationMetadata>,
}

fn object_at<'a>(document: &'a Document, path: &[&str]) -> Option<&'a Map<String, Value>> {
    path.iter().try_fold(document, |value, key| value.get(key))?.as_object()
}

/// Overwrite `target` with the string at `key`, if there is one.
fn merge_str(target: &mut Option<CompactString>, object: &Map<String, Value>, key: &str) {
    if let Some(s) = object.get(key).and_then(Value::as_str) {
        *target = Some(s.into());
    }
}

impl MeasurementMetadata {
    fn merge(&mut self, object: &Map<String, Value>) {
        merge_str(&mut self.name, object, "name");
        merge_str(&mut self.description, object, "description");
        merge_str(&mut self.unit, object, "unit");

        if let Some(b) = object.get("bigger_is_better").and_then(Value::as_bool) {
            self.bigger_is_better = Some(b);
        }

        let aggregations = object.get("aggregations").and_then(Value::as_object).into_iter().flatten();
        for (id, aggregation) in aggregations {
            if let Some(aggregation) = aggregation.as_object() {
                let entry = self.aggregations.entry(id.as_str().into()).or_default();
                merge_str(&mut entry.name, aggregation, "name");
                merge_str(&mut entry.description, aggregation, "description");
            }
        }
    }
}

/// Describe every measurement present in `documents`.
///
/// Aggregation ids are collected from each document's measurements and unioned per measurement.
/// Optional metadata is merged separately, with later documents overwriting earlier ones field by
/// field; a missing or null field never erases an earlier value. Names default to ids.
///
/// Metadata for a measurement that never appears with data is discarded. The result is sorted by
/// measurement id, and each measurement's aggregations are sorted by aggregation id.
#[must_use]
pub fn consolidate_measurements(documents: &[Document]) -> Vec<MeasurementInfo> {
    let mut observed: BTreeMap<CompactString, BTreeSet<CompactString>> = BTreeMap::new();
    let mut metadata: BTreeMap<CompactString, MeasurementMetadata> = BTreeMap::new();

    for document in documents {
        for (id, aggregations) in object_at(document, &MEASUREMENTS_PATH).into_iter().flatten() {
            if let Some(aggregations) = aggregations.as_object() {
                observed
                    .entry(id.as_str().into())
                    .or_default()
                    .extend(aggregations.keys().map(|k| CompactString::from(k.as_str())));
            }
        }

        for (id, meta) in object_at(document, &METADATA_PATH).into_iter().flatten() {
            if let Some(meta) = meta.as_object() {
                metadata.entry(id.as_str().into()).or_default().merge(meta);
            }
        }
    }

    for id in metadata.keys().filter(|id| !observed.contains_key(*id)) {
        debug!(target: LOG_TARGET, "ignoring metadata for '{id}' which has no data");
    }

    let result: Vec<MeasurementInfo> = observed
        .into_iter()
        .map(|(id, aggregation_ids)| {
            let mut meta = metadata.remove(&id).unwrap_or_default();

            let aggregations = aggregation_ids
                .into_iter()
                .map(|agg_id| {
                    let agg_meta = meta.aggregations.remove(&agg_id).unwrap_or_default();
                    AggregationInfo {
                        name: agg_meta.name.unwrap_or_else(|| agg_id.clone()),
                        description: agg_meta.description,
                        id: agg_id,
                    }
                })
                .collect();

            MeasurementInfo {
                name: meta.name.unwrap_or_else(|| id.clone()),
                description: meta.description,
                unit: meta.unit,
                bigger_is_better: meta.bigger_is_better.unwrap_or(false),
                aggregations,
                id,
            }
        })
        .collect();

    debug!(target: LOG_TARGET, "found {} measurements in {} documents", result.len(), documents.len());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn aggregation(id: &str, name: &str, description: Option<&str>) -> AggregationInfo {
        AggregationInfo {
            id: id.into(),
            name: name.into(),
            description: description.map(Into::into),
        }
    }

    fn ids(info: &MeasurementInfo) -> Vec<&str> {
        info.aggregation_ids().collect()
    }

    #[test]
    fn test_union_of_aggregations() {
        let docs = [
            json!({"results": {"measurements": {
                "cpu_usage": {"mean": 1, "q05": 2, "max": 4},
                "ram_usage": {"mean": 1, "q051": 2, "q091": 3, "max": 4}
            }}}),
            json!({"results": {"measurements": {
                "cpu_usage": {"q05": 2, "q09": 3, "max": 4},
                "disc_usage": {"mean": 1, "q05": 2, "max": 4}
            }}}),
            json!({"results": {"measurements": {"net_usage": {"mean": 1, "max": 4}}}}),
        ];

        let measurements = consolidate_measurements(&docs);
        let names: Vec<_> = measurements.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["cpu_usage", "disc_usage", "net_usage", "ram_usage"]);

        assert_eq!(ids(&measurements[0]), ["max", "mean", "q05", "q09"]);
        assert_eq!(ids(&measurements[1]), ["max", "mean", "q05"]);
        assert_eq!(ids(&measurements[2]), ["max", "mean"]);
        assert_eq!(ids(&measurements[3]), ["max", "mean", "q051", "q091"]);

        assert!(measurements.iter().flat_map(|m| &m.aggregations).all(|a| a.name == a.id && a.description.is_none()));
    }

    #[test]
    fn test_metadata_join() {
        let docs = [
            json!({"results": {
                "measurements": {"cpu_usage": {"mean": 1, "max": 4}},
                "_meta": {"measurements": {"cpu_usage": {
                    "name": "CPU Usage",
                    "aggregations": {"mean": {"name": "mean_extended", "description": "some description"}}
                }}}
            }}),
            json!({"results": {"measurements": {"disk_usage": {"mean": 1, "max": 4}}}}),
        ];

        let measurements = consolidate_measurements(&docs);
        assert_eq!(
            measurements,
            [
                MeasurementInfo {
                    id: "cpu_usage".into(),
                    name: "CPU Usage".into(),
                    description: None,
                    unit: None,
                    bigger_is_better: false,
                    aggregations: vec![
                        aggregation("max", "max", None),
                        aggregation("mean", "mean_extended", Some("some description")),
                    ],
                },
                MeasurementInfo {
                    id: "disk_usage".into(),
                    name: "disk_usage".into(),
                    description: None,
                    unit: None,
                    bigger_is_better: false,
                    aggregations: vec![aggregation("max", "max", None), aggregation("mean", "mean", None)],
                },
            ]
        );
    }

    #[test]
    fn test_metadata_without_data_is_dropped() {
        let docs = [json!({"results": {
            "measurements": {"cpu_usage": {"mean": 1}},
            "_meta": {"measurements": {
                "cpu_usage": {"unit": "cores", "description": "CPU Usage in cores"},
                "ram_usage": {"name": "RAM"}
            }}
        }})];

        let measurements = consolidate_measurements(&docs);
        assert_eq!(measurements.len(), 1);
        assert_eq!(measurements[0].id, "cpu_usage");
        assert_eq!(measurements[0].unit.as_deref(), Some("cores"));
        assert_eq!(measurements[0].description.as_deref(), Some("CPU Usage in cores"));
    }

    #[test]
    fn test_last_non_null_metadata_wins() {
        let docs = [
            json!({"results": {
                "measurements": {"latency": {"p50": 1}},
                "_meta": {"measurements": {"latency": {"name": "Latency", "unit": "ms", "bigger_is_better": true}}}
            }}),
            json!({"results": {
                "_meta": {"measurements": {"latency": {"name": "Request latency", "unit": null}}}
            }}),
            json!({"results": {
                "_meta": {"measurements": {"latency": {"aggregations": {"p50": {"name": "median"}}}}}
            }}),
            json!({"results": {
                "_meta": {"measurements": {"latency": {"aggregations": {"p50": {"description": "50th percentile"}}}}}
            }}),
        ];

        let measurements = consolidate_measurements(&docs);
        let latency = &measurements[0];
        assert_eq!(latency.name, "Request latency");
        assert_eq!(latency.unit.as_deref(), Some("ms"));
        assert!(latency.bigger_is_better);
        assert_eq!(latency.aggregations, [aggregation("p50", "median", Some("50th percentile"))]);
    }

    #[test]
    fn test_no_metadata_anywhere() {
        let docs = [json!({"results": {"measurements": {"m": {"a": 1}}}}), json!({"unrelated": true}), json!(42)];
        let measurements = consolidate_measurements(&docs);
        assert_eq!(measurements.len(), 1);
        assert_eq!(measurements[0].name, "m");
        assert!(!measurements[0].bigger_is_better);
    }

    #[test]
    fn test_empty_collection() {
        assert!(consolidate_measurements(&[]).is_empty());
    }
}
