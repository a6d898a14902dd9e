//! Measurement descriptors consolidated from a document collection
//!
//! # Implementation Model
//!
//! Documents report measurements as `results.measurements.<id>.<aggregation> = number` and may
//! carry optional descriptive metadata under `results._meta.measurements`. Producers evolve
//! independently, so metadata can be complete, partial or absent.
//!
//! [`consolidate_measurements`] makes two passes: one collects the aggregation ids actually
//! present for each measurement, the other merges metadata with last-non-null-wins semantics.
//! The two are joined on the measurement id; data always wins, so metadata for a measurement
//! that never appears with values is dropped.

mod consolidator;
mod measurement_info;

pub use consolidator::consolidate_measurements;
pub use measurement_info::{AggregationInfo, MeasurementInfo};
