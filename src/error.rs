//! # Engine Errors
//!
//! Contract violations and the one transport outcome that is raised to the caller
//! (a `404`). Every other transport failure is absorbed into the resource's
//! [`State`](crate::state::State) by the classifier and never shows up here.

use thiserror::Error;

/// Result type for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during synchronization.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    /// The resource has no link for the requested relation.
    #[error("no link relation '{rel}' on {}", .uri.as_deref().unwrap_or("unknown"))]
    MissingLink {
        /// The relation that was looked up.
        rel: String,
        /// Self URI of the resource, when it has one.
        uri: Option<String>,
    },

    /// The operation requires a tracked resource.
    #[error("resource has no state on {}", .uri.as_deref().unwrap_or("unknown"))]
    Untracked {
        /// Self URI of the resource, when it has one.
        uri: Option<String>,
    },

    /// The server reported the resource as gone (HTTP 404). The resource is marked deleted.
    #[error("likely stale resource, not found: {uri}")]
    NotFound {
        /// The URI that returned 404.
        uri: String,
    },

    /// The operation is not supported for this kind of resource.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// The payload did not match any known representation shape.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SyncError {
    /// Creates a missing-link error.
    pub fn missing_link(rel: impl Into<String>, uri: Option<String>) -> Self {
        Self::MissingLink {
            rel: rel.into(),
            uri,
        }
    }

    /// Creates an untracked-resource error.
    pub fn untracked(uri: Option<String>) -> Self {
        Self::Untracked { uri }
    }

    /// Returns true for errors caused by how the engine was called rather than by the server.
    pub fn is_contract_error(&self) -> bool {
        matches!(
            self,
            SyncError::MissingLink { .. } | SyncError::Untracked { .. } | SyncError::Unsupported(_)
        )
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Protocol(e.to_string())
    }
}
