//! Mapping transport failures onto resource state.
//!
//! | Failure                 | Status      | Raised        |
//! |-------------------------|-------------|---------------|
//! | 403                     | `forbidden` | no            |
//! | 404                     | `deleted`   | yes, `NotFound` |
//! | other 400-499           | `unknown`   | no            |
//! | 500-599                 | `unknown`   | no            |
//! | anything else, network  | `unknown`   | no            |
//!
//! Only a 404 is raised: a collection pointing at a resource that no longer exists
//! is stale, and the caller has to decide what to do about it.

use chrono::Utc;
use tracing::{error, info};

use crate::error::{SyncError, SyncResult};
use crate::model::Resource;
use crate::state::{Headers, StateStore, Status};
use crate::transport::TransportError;

/// How a transport failure affects a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Forbidden { headers: Headers },
    Deleted,
    ClientError { status: u16, status_text: String },
    ServerError { status: u16, status_text: String },
    Unexpected { message: String },
}

impl Classification {
    pub fn classify(err: &TransportError) -> Self {
        match err {
            TransportError::Status { status: 403, headers, .. } => Classification::Forbidden {
                headers: headers.clone(),
            },
            TransportError::Status { status: 404, .. } => Classification::Deleted,
            TransportError::Status {
                status: status @ 400..=499,
                status_text,
                ..
            } => Classification::ClientError {
                status: *status,
                status_text: status_text.clone(),
            },
            TransportError::Status {
                status: status @ 500..=599,
                status_text,
                ..
            } => Classification::ServerError {
                status: *status,
                status_text: status_text.clone(),
            },
            other => Classification::Unexpected {
                message: other.to_string(),
            },
        }
    }

    /// The status the resource ends up in.
    pub fn status(&self) -> Status {
        match self {
            Classification::Forbidden { .. } => Status::Forbidden,
            Classification::Deleted => Status::Deleted,
            _ => Status::Unknown,
        }
    }

    pub fn is_raised(&self) -> bool {
        matches!(self, Classification::Deleted)
    }

    /// Records the classification on `resource`'s state. Returns an error for a 404.
    pub fn apply(self, store: &StateStore, resource: &Resource, uri: &str) -> SyncResult<()> {
        let status = self.status();
        match self {
            Classification::Forbidden { headers } => {
                info!(uri, "Request forbidden");
                store.update(resource, |state| {
                    state.transition(status);
                    state.record_response(headers, Utc::now());
                });
            }
            Classification::Deleted => {
                info!(uri, self_uri = ?resource.self_uri(), "Likely stale resource, not found");
                store.transition(resource, status);
                return Err(SyncError::NotFound {
                    uri: uri.to_string(),
                });
            }
            Classification::ClientError { status: code, status_text } => {
                info!(uri, code, %status_text, "Client error");
                store.transition(resource, status);
            }
            Classification::ServerError { status: code, status_text } => {
                info!(uri, code, %status_text, "Server error");
                store.transition(resource, status);
            }
            Classification::Unexpected { message } => {
                error!(uri, %message, "Request error");
                store.transition(resource, status);
            }
        }
        Ok(())
    }
}
