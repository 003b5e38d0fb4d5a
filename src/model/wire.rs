//! Wire representations and the payload variant they decode into.
//!
//! A response body is classified exactly once, when it is decoded, into one of
//! [`Payload::Singleton`], [`Payload::Collection`] or [`Payload::Feed`]. The rest of
//! the engine matches on the variant and never inspects shapes again.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::link::{self, Link};
use crate::error::{SyncError, SyncResult};

/// A resource as it travels over the wire: links plus open-ended attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedDocument {
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl LinkedDocument {
    pub fn new(links: Vec<Link>) -> Self {
        Self {
            links,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn uri(&self, rel: &str) -> Option<String> {
        link::uri(&self.links, rel)
    }
}

/// A collection carrying its members inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionDocument {
    #[serde(default)]
    pub links: Vec<Link>,
    pub items: Vec<LinkedDocument>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// One entry of a feed: the address of a member and its display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

impl FeedItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// The lightweight membership listing returned for a collection fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    #[serde(default)]
    pub links: Vec<Link>,
    pub items: Vec<FeedItem>,
}

impl Feed {
    pub fn new(items: Vec<FeedItem>) -> Self {
        Self {
            links: Vec::new(),
            items,
        }
    }

    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = links;
        self
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Singleton(LinkedDocument),
    Collection(CollectionDocument),
    Feed(Feed),
}

enum Shape {
    Singleton,
    Collection,
    Feed,
}

impl Payload {
    /// Classifies and decodes a JSON body.
    ///
    /// An `items` array whose entries all look like `{id, title}` (and carry no links)
    /// is a feed; any other `items` array is an inline collection; no `items` is a singleton.
    pub fn from_value(value: Value) -> SyncResult<Self> {
        let shape = match &value {
            Value::Object(object) => match object.get("items") {
                Some(Value::Array(items)) if items.iter().all(is_feed_item) => Shape::Feed,
                Some(Value::Array(_)) => Shape::Collection,
                _ => Shape::Singleton,
            },
            other => {
                return Err(SyncError::Protocol(format!(
                    "expected an object representation, found {}",
                    kind_of(other)
                )))
            }
        };

        Ok(match shape {
            Shape::Feed => Payload::Feed(serde_json::from_value(value)?),
            Shape::Collection => Payload::Collection(serde_json::from_value(value)?),
            Shape::Singleton => Payload::Singleton(serde_json::from_value(value)?),
        })
    }

    pub fn from_slice(bytes: &[u8]) -> SyncResult<Self> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    pub fn links(&self) -> &[Link] {
        match self {
            Payload::Singleton(doc) => &doc.links,
            Payload::Collection(doc) => &doc.links,
            Payload::Feed(feed) => &feed.links,
        }
    }
}

impl From<LinkedDocument> for Payload {
    fn from(doc: LinkedDocument) -> Self {
        Payload::Singleton(doc)
    }
}

impl From<Feed> for Payload {
    fn from(feed: Feed) -> Self {
        Payload::Feed(feed)
    }
}

impl From<CollectionDocument> for Payload {
    fn from(doc: CollectionDocument) -> Self {
        Payload::Collection(doc)
    }
}

fn is_feed_item(value: &Value) -> bool {
    value.get("id").is_some_and(Value::is_string) && value.get("links").is_none()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
