//! # Mock Transport
//!
//! A [`Transport`] with expectation tracking for testing the engine without a server.
//!
//! Expectations are matched by method and URI, first match wins, so concurrent
//! item loads can arrive in any order. Every call is recorded, and each exchange
//! logs an [`Event::Started`] / [`Event::Finished`] pair so tests can assert how
//! requests interleaved.
//!
//! # Example
//! ```ignore
//! let mock = MockTransport::new();
//! mock.expect_load("https://api.example.com/q/1").return_ok(document);
//! mock.expect_load("https://api.example.com/q/2").return_status(403);
//!
//! let engine = SyncEngine::new(mock.clone());
//! // Drive the engine...
//! mock.verify(); // Ensures all expectations were met
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use super::{RequestOptions, Response, Transport, TransportError, TransportResult};
use crate::model::{Link, Payload};

/// The transport operation a call used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Load,
    Create,
    Update,
    Delete,
}

/// A request the mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: Method,
    pub uri: String,
    pub rel: String,
    pub document: Option<Value>,
    pub accept: Option<String>,
}

/// Start and end of an exchange, keyed by URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(String),
    Finished(String),
}

struct Expectation {
    method: Method,
    uri: String,
    delay: Option<Duration>,
    response: TransportResult<Response>,
}

#[derive(Default)]
struct Inner {
    expectations: Mutex<VecDeque<Expectation>>,
    calls: Mutex<Vec<Call>>,
    events: Mutex<Vec<Event>>,
}

/// A scripted transport. Clones share expectations and logs.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `load` of `uri`.
    pub fn expect_load(&self, uri: impl Into<String>) -> ExpectationBuilder {
        self.expect(Method::Load, uri)
    }

    /// Expects a `create` posted to `uri`.
    pub fn expect_create(&self, uri: impl Into<String>) -> ExpectationBuilder {
        self.expect(Method::Create, uri)
    }

    /// Expects an `update` of `uri`.
    pub fn expect_update(&self, uri: impl Into<String>) -> ExpectationBuilder {
        self.expect(Method::Update, uri)
    }

    /// Expects a `delete` of `uri`.
    pub fn expect_delete(&self, uri: impl Into<String>) -> ExpectationBuilder {
        self.expect(Method::Delete, uri)
    }

    fn expect(&self, method: Method, uri: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            inner: self.inner.clone(),
            method,
            uri: uri.into(),
            delay: None,
        }
    }

    /// Every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().len()
    }

    pub fn events(&self) -> Vec<Event> {
        self.inner.events.lock().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining: Vec<String> = self
            .inner
            .expectations
            .lock()
            .iter()
            .map(|e| format!("{:?} {}", e.method, e.uri))
            .collect();
        if !remaining.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining: {:?}",
                remaining.len(),
                remaining
            );
        }
    }

    async fn respond(
        &self,
        method: Method,
        link: &Link,
        document: Option<&Value>,
        options: &RequestOptions,
    ) -> TransportResult<Response> {
        self.inner.calls.lock().push(Call {
            method,
            uri: link.href.clone(),
            rel: link.rel.clone(),
            document: document.cloned(),
            accept: options.accept.clone(),
        });

        let expectation = {
            let mut expectations = self.inner.expectations.lock();
            let position = expectations
                .iter()
                .position(|e| e.method == method && e.uri == link.href);
            position.and_then(|i| expectations.remove(i))
        };
        let Some(expectation) = expectation else {
            panic!("Unexpected request: {:?} {}", method, link.href);
        };

        debug!(?method, uri = %link.href, "Mock request");
        self.inner.events.lock().push(Event::Started(link.href.clone()));
        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.events.lock().push(Event::Finished(link.href.clone()));

        expectation.response
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn load(&self, link: &Link, options: &RequestOptions) -> TransportResult<Response> {
        self.respond(Method::Load, link, None, options).await
    }

    async fn create(
        &self,
        link: &Link,
        document: &Value,
        options: &RequestOptions,
    ) -> TransportResult<Response> {
        self.respond(Method::Create, link, Some(document), options).await
    }

    async fn update(
        &self,
        link: &Link,
        document: &Value,
        options: &RequestOptions,
    ) -> TransportResult<Response> {
        self.respond(Method::Update, link, Some(document), options).await
    }

    async fn delete(&self, link: &Link, options: &RequestOptions) -> TransportResult<Response> {
        self.respond(Method::Delete, link, None, options).await
    }
}

/// Builder for a single expectation.
pub struct ExpectationBuilder {
    inner: Arc<Inner>,
    method: Method,
    uri: String,
    delay: Option<Duration>,
}

impl ExpectationBuilder {
    /// Delays the response, keeping the exchange open.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Responds `200` with `data`.
    pub fn return_ok(self, data: impl Into<Payload>) {
        self.return_response(Response::ok(data));
    }

    /// Responds `201` with a `Location` header.
    pub fn return_created(self, location: impl Into<String>) {
        self.return_response(Response::created(location));
    }

    /// Fails with an HTTP status error.
    pub fn return_status(self, status: u16) {
        self.return_err(TransportError::status(status));
    }

    pub fn return_response(self, response: Response) {
        self.push(Ok(response));
    }

    pub fn return_err(self, error: TransportError) {
        self.push(Err(error));
    }

    fn push(self, response: TransportResult<Response>) {
        self.inner.expectations.lock().push_back(Expectation {
            method: self.method,
            uri: self.uri,
            delay: self.delay,
            response,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkedDocument;

    #[tokio::test]
    async fn matches_expectations_by_uri() {
        let mock = MockTransport::new();
        mock.expect_load("https://api.example.com/a").return_status(500);
        mock.expect_load("https://api.example.com/b")
            .return_ok(LinkedDocument::default().with_attribute("name", "b"));

        let options = RequestOptions::default();
        let b = mock
            .load(&Link::new("self", "https://api.example.com/b"), &options)
            .await
            .unwrap();
        assert_eq!(b.status, 200);

        let a = mock
            .load(&Link::new("self", "https://api.example.com/a"), &options)
            .await;
        assert_eq!(a.unwrap_err().status_code(), Some(500));

        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.calls()[0].uri, "https://api.example.com/b");
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn verify_reports_leftovers() {
        let mock = MockTransport::new();
        mock.expect_delete("https://api.example.com/a").return_response(Response::no_content());
        mock.verify();
    }

    #[tokio::test]
    async fn records_documents_and_events() {
        let mock = MockTransport::new();
        mock.expect_create("https://api.example.com/q")
            .return_created("https://api.example.com/q/9");

        let document = serde_json::json!({ "name": "new" });
        let response = mock
            .create(
                &Link::new("self", "https://api.example.com/q"),
                &document,
                &RequestOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers.location(), Some("https://api.example.com/q/9"));
        assert_eq!(mock.calls()[0].document, Some(document));
        assert_eq!(
            mock.events(),
            vec![
                Event::Started("https://api.example.com/q".into()),
                Event::Finished("https://api.example.com/q".into())
            ]
        );
    }
}
