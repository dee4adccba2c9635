//! Stone types - the catalog's record model
//!
//! A `StoneRecord` is what the store persists. Callers never see it directly:
//! every query hands out one of the two projections.
//! - `StoneSummary`: the list projection (no description/location)
//! - `StoneDetail`: the single-record projection

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A persisted trail stone (Wanderstein).
///
/// `id`, `created_at` and `updated_at` are assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoneRecord {
    /// Surrogate identifier from the store's sequence
    pub id: i64,
    /// Display name
    pub name: String,
    /// Human-assigned code, e.g. `WS-2024-001`. Unique across the store.
    pub unique_id: String,
    /// URL of a preview image
    pub preview_url: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Free-text location, e.g. `Schwarzwald, Baden-Württemberg`
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoneRecord {
    /// Project into the list response shape
    pub fn to_summary(&self) -> StoneSummary {
        StoneSummary {
            id: self.id,
            name: self.name.clone(),
            unique_id: self.unique_id.clone(),
            preview_url: self.preview_url.clone().unwrap_or_default(),
            created_at: format_timestamp(&self.created_at),
        }
    }

    /// Project into the detail response shape
    pub fn to_detail(&self) -> StoneDetail {
        StoneDetail {
            id: self.id,
            name: self.name.clone(),
            unique_id: self.unique_id.clone(),
            preview_url: self.preview_url.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            location: self.location.clone().unwrap_or_default(),
            created_at: format_timestamp(&self.created_at),
            updated_at: format_timestamp(&self.updated_at),
        }
    }
}

/// Insert payload for a stone. The store fills in id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStone {
    pub name: String,
    pub unique_id: String,
    pub preview_url: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl NewStone {
    /// Create a new stone with the required fields only
    pub fn new(name: impl Into<String>, unique_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique_id: unique_id.into(),
            preview_url: None,
            description: None,
            location: None,
        }
    }

    /// Set the preview image URL
    pub fn with_preview_url(mut self, url: impl Into<String>) -> Self {
        self.preview_url = Some(url.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Public projection returned by the list queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoneSummary {
    pub id: i64,
    pub name: String,
    pub unique_id: String,
    pub preview_url: String,
    /// RFC3339, second precision, e.g. `2024-01-15T10:30:00Z`
    pub created_at: String,
}

/// Public projection returned by the single-stone lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoneDetail {
    pub id: i64,
    pub name: String,
    pub unique_id: String,
    pub preview_url: String,
    pub description: String,
    pub location: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Format a timestamp the way the API exposes it
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
