//! The analysis entity and its write-side inputs

use crate::policy::AccessPolicy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved analytical configuration plus resource metadata
///
/// `data` is an opaque JSON-encoded payload whose internal shape belongs to
/// the client; the store guarantees it is valid JSON text but never
/// interprets it.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Opaque numeric identifier, assigned at creation, immutable
    pub id: u64,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Owning principal
    pub owner: String,
    /// JSON-encoded configuration payload
    pub data: String,
    /// Detail-view counter, monotonic
    pub popular_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_of_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub keywords: Vec<String>,
    pub created: DateTime<Utc>,
    /// Per-entity permission grants, never serialized to clients
    #[serde(skip_serializing)]
    pub policy: AccessPolicy,
}

/// Input for the create operation
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub title: String,
    pub abstract_text: String,
    pub owner: String,
    /// JSON-encoded payload (validated by the store before persistence)
    pub data: String,
}

/// Metadata fields persisted by the metadata operation
///
/// Title and abstract are expected to be sanitized by the caller before
/// they reach the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataUpdate {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub point_of_contact: Option<String>,
    #[serde(default)]
    pub metadata_author: Option<String>,
}

/// A rating attached to one analysis
///
/// Ratings are dependent rows: removing an analysis purges its ratings in
/// the same logical unit.
#[derive(Debug, Clone, Serialize)]
pub struct Rating {
    pub analysis_id: u64,
    pub principal: String,
    pub score: u8,
}
