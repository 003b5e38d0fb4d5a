//! Lifecycle status of a tracked resource.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a resource stands relative to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    /// Client-side only, no URI yet.
    Virtual,
    /// Known only by its URI.
    LocationOnly,
    /// Tracked, but the last attempt to reach the server was inconclusive.
    Unknown,
    Hydrated,
    /// Hydrated once, now known to be out of date.
    Stale,
    Forbidden,
    Deleted,
    DeleteInProgress,
}

impl Status {
    /// Guarded resources are never fetched or deleted; the engine returns them unchanged.
    pub fn is_guarded(self) -> bool {
        matches!(
            self,
            Status::Virtual | Status::Forbidden | Status::Deleted | Status::DeleteInProgress
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Virtual => "virtual",
            Status::LocationOnly => "locationOnly",
            Status::Unknown => "unknown",
            Status::Hydrated => "hydrated",
            Status::Stale => "stale",
            Status::Forbidden => "forbidden",
            Status::Deleted => "deleted",
            Status::DeleteInProgress => "deleteInProgress",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
