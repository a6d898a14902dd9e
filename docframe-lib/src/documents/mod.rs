//! Documents and where they come from
//!
//! A document is one semi-structured test-result record. No schema is assumed beyond two
//! conventions: tags live in a label list at `metadata.labels`, and the time a record was last
//! written is `metadata.timeUpdated`.

mod labels;
mod source;

pub use labels::{LabelFilter, LabelPair, label_text, label_value, labels};
pub use source::{DEFAULT_IDENTITY_LABELS, DocumentSource, JsonFileSource, check_documents};

/// One test-result record.
pub type Document = serde_json::Value;
