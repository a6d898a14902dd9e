#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for docframe
//!
//! This library turns collections of semi-structured test-result documents into typed,
//! column-major tables that can be sorted, grouped and reported.
//!
//! # Module Organization
//!
//! - [`documents`]: Documents, their labels and where they come from
//! - [`extract`]: Path queries and value/row extractors
//! - [`table`]: Table specs, the table builder and grouping
//! - [`measurements`]: Measurement metadata consolidation
//! - [`reports`]: Report generation in multiple formats
//! - [`commands`]: Command-line interface and orchestration

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod documents;
pub mod extract;
pub mod measurements;
pub mod table;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

pub use crate::commands::{Host, run};
