//! Batch ingestion report.
//!
//! A malformed item never aborts a batch: it is recorded here and the rest
//! of the batch is processed.

use respond_models::ValidationError;
use serde::Serialize;

/// An item rejected at the registry boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejected {
    /// Position of the item in the batch.
    pub index: usize,
    /// Id of the item, when it could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Why it was rejected.
    #[serde(serialize_with = "serialize_error")]
    pub error: ValidationError,
}

fn serialize_error<S: serde::Serializer>(
    error: &ValidationError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Outcome of a batch upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    /// Ids of the items stored.
    pub accepted: Vec<String>,
    /// Items skipped, in batch order.
    pub rejected: Vec<Rejected>,
}

impl IngestReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn accept(&mut self, id: impl Into<String>) {
        self.accepted.push(id.into());
    }

    pub(crate) fn reject(&mut self, index: usize, id: Option<String>, error: ValidationError) {
        self.rejected.push(Rejected { index, id, error });
    }

    /// Returns true if every item was stored.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Best-effort id extraction from a raw JSON item.
pub(crate) fn raw_id(value: &serde_json::Value) -> Option<String> {
    value.get("id").and_then(|v| v.as_str()).map(str::to_string)
}
