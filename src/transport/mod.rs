//! # Transport Boundary
//!
//! The engine never speaks HTTP itself. It hands a [`Link`] (which carries the
//! relation that was followed) to a [`Transport`] and receives a [`Response`] whose
//! body has already been decoded into a [`Payload`].
//!
//! Failures come back as [`TransportError`]; the engine classifies them into
//! resource state (see [`crate::sync::classify`]).

pub mod mock;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::model::{Link, Payload};
use crate::state::Headers;

pub use mock::MockTransport;

/// Result type for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Per-request settings forwarded to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Media type the caller accepts.
    pub accept: Option<String>,
}

/// A successful transport exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub data: Option<Payload>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            data: None,
        }
    }

    /// A `200` carrying `data`.
    pub fn ok(data: impl Into<Payload>) -> Self {
        Self::new(200).with_data(data)
    }

    /// A `201` pointing at the new resource.
    pub fn created(location: impl Into<String>) -> Self {
        Self::new(201).with_header("location", location)
    }

    pub fn no_content() -> Self {
        Self::new(204)
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_data(mut self, data: impl Into<Payload>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Errors raised by a transport.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("{status} {status_text}")]
    Status {
        status: u16,
        status_text: String,
        headers: Headers,
    },

    /// No response was received.
    #[error("network error: {0}")]
    Network(String),
}

impl TransportError {
    /// A status error with the standard reason phrase and no headers.
    pub fn status(status: u16) -> Self {
        Self::Status {
            status,
            status_text: reason_phrase(status).to_string(),
            headers: Headers::new(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Network(_) => None,
        }
    }
}

impl From<String> for TransportError {
    fn from(s: String) -> Self {
        TransportError::Network(s)
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        410 => "Gone",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

/// The HTTP adapter the engine drives.
///
/// Implementations must be shareable across tasks; the engine issues concurrent
/// `load` calls when hydrating collection items.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET the target of `link`.
    async fn load(&self, link: &Link, options: &RequestOptions) -> TransportResult<Response>;

    /// POST `document` to the target of `link`.
    async fn create(
        &self,
        link: &Link,
        document: &Value,
        options: &RequestOptions,
    ) -> TransportResult<Response>;

    /// PUT `document` to the target of `link`.
    async fn update(
        &self,
        link: &Link,
        document: &Value,
        options: &RequestOptions,
    ) -> TransportResult<Response>;

    /// DELETE the target of `link`.
    async fn delete(&self, link: &Link, options: &RequestOptions) -> TransportResult<Response>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display() {
        let err = TransportError::status(404);
        assert_eq!(err.to_string(), "404 Not Found");
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(TransportError::from("reset".to_string()).status_code(), None);
    }

    #[test]
    fn created_carries_location() {
        let response = Response::created("https://api.example.com/q/2");
        assert_eq!(response.status, 201);
        assert_eq!(response.headers.location(), Some("https://api.example.com/q/2"));
        assert!(response.data.is_none());
    }
}
