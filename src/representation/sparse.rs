//! # Sparse Representations
//!
//! Builds minimally populated, tracked resources: from a bare URI, a feed item,
//! or nothing at all. A resource built without a URI is always
//! [`Status::Virtual`]; one built from a URI defaults to
//! [`Status::LocationOnly`].

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use super::SingletonMerger;
use crate::model::{rel, Feed, FeedItem, Link, LinkedDocument, Resource};
use crate::state::{State, StateStore, Status};

/// What shape of resource to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SparseType {
    #[default]
    Singleton,
    Collection,
}

/// A seed for a member of a sparse collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SparseItem {
    Uri(String),
    FeedItem(FeedItem),
}

impl From<&str> for SparseItem {
    fn from(uri: &str) -> Self {
        SparseItem::Uri(uri.to_string())
    }
}

impl From<String> for SparseItem {
    fn from(uri: String) -> Self {
        SparseItem::Uri(uri)
    }
}

impl From<FeedItem> for SparseItem {
    fn from(item: FeedItem) -> Self {
        SparseItem::FeedItem(item)
    }
}

/// Options for [`SparseFactory::make`].
#[derive(Debug, Clone, Default)]
pub struct SparseOptions {
    pub uri: Option<String>,
    /// Requested initial status. Ignored when there is no URI.
    pub status: Option<Status>,
    pub sparse_type: SparseType,
    /// Initial attribute values.
    pub defaults: Map<String, Value>,
    /// Initial members, for collections.
    pub default_items: Vec<SparseItem>,
}

impl SparseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn collection(mut self) -> Self {
        self.sparse_type = SparseType::Collection;
        self
    }

    pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_default_items<I: Into<SparseItem>>(mut self, items: impl IntoIterator<Item = I>) -> Self {
        self.default_items = items.into_iter().map(Into::into).collect();
        self.sparse_type = SparseType::Collection;
        self
    }
}

/// Creates tracked sparse resources against one [`StateStore`].
#[derive(Clone)]
pub struct SparseFactory {
    store: Arc<StateStore>,
    mapped_title: String,
}

impl SparseFactory {
    /// `mapped_title` names the attribute a feed item's title is written to.
    pub fn new(store: Arc<StateStore>, mapped_title: impl Into<String>) -> Self {
        Self {
            store,
            mapped_title: mapped_title.into(),
        }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn mapped_title(&self) -> &str {
        &self.mapped_title
    }

    pub fn make(&self, options: SparseOptions) -> Resource {
        let status = match &options.uri {
            Some(_) => options.status.unwrap_or(Status::LocationOnly),
            None => Status::Virtual,
        };
        let links = self_links(options.uri.as_deref());

        let resource = match options.sparse_type {
            SparseType::Singleton => Resource::new(links, options.defaults),
            SparseType::Collection => {
                let items = options
                    .default_items
                    .into_iter()
                    .map(|item| self.make_item(item))
                    .collect();
                let collection = Resource::collection(links, items);
                collection.write().attributes = options.defaults;
                collection
            }
        };

        self.store.track(&resource, State::new(status));
        debug!(id = %resource.id(), %status, uri = ?options.uri, "Sparse resource");
        resource
    }

    pub fn from_uri(&self, uri: impl Into<String>) -> Resource {
        self.make(SparseOptions::new().with_uri(uri))
    }

    /// A sparse member carrying the item's title under the mapped attribute.
    pub fn from_feed_item(&self, item: &FeedItem) -> Resource {
        let mut defaults = Map::new();
        defaults.insert(self.mapped_title.clone(), Value::String(item.title.clone()));
        self.make(
            SparseOptions::new()
                .with_uri(item.id.clone())
                .with_defaults(defaults),
        )
    }

    pub fn collection_from_uri(&self, uri: impl Into<String>) -> Resource {
        self.make(SparseOptions::new().with_uri(uri).collection())
    }

    /// A sparse collection whose members are the feed's items.
    pub fn collection_from_feed(&self, uri: Option<String>, feed: &Feed) -> Resource {
        let mut options = SparseOptions::new().with_default_items(feed.items.iter().cloned());
        options.uri = uri;
        let collection = self.make(options);
        if !feed.links.is_empty() {
            collection.write().links = feed.links.clone();
        }
        collection
    }

    /// A tracked resource built from a full wire document.
    pub fn from_document(&self, document: LinkedDocument, status: Status) -> Resource {
        let resource = Resource::from_document(document);
        self.attach(&resource, status);
        resource
    }

    /// Attaches a fresh state record to an existing plain resource.
    pub fn wrap(&self, resource: &Resource, status: Status) -> Resource {
        let status = if resource.self_uri().is_some() {
            status
        } else {
            Status::Virtual
        };
        self.attach(resource, status);
        resource.clone()
    }

    /// Returns the child `name` of `parent`, adding a sparse one for `uri` when absent.
    pub fn add_child_from_uri(&self, parent: &Resource, name: &str, uri: &str) -> Resource {
        if let Some(existing) = parent.child(name) {
            return existing;
        }
        SingletonMerger::add(&self.store, parent, name, self.from_uri(uri))
    }

    /// Adds a child resource whose value, URI included, is not yet known.
    pub fn add_unknown_child(&self, parent: &Resource, name: &str, defaults: Map<String, Value>) -> Resource {
        let child = Resource::new(Vec::new(), defaults);
        self.attach(&child, Status::Unknown);
        SingletonMerger::add(&self.store, parent, name, child)
    }

    /// Adds a child collection whose value, URI included, is not yet known.
    pub fn add_unknown_collection(&self, parent: &Resource, name: &str, defaults: Map<String, Value>) -> Resource {
        let child = Resource::collection(Vec::new(), Vec::new());
        child.write().attributes = defaults;
        self.attach(&child, Status::Unknown);
        SingletonMerger::add(&self.store, parent, name, child)
    }

    /// Appends sparse members for `uris`, skipping any already present by self URI.
    /// Returns the members that were added.
    pub fn add_items_from_uris(&self, collection: &Resource, uris: &[String]) -> Vec<Resource> {
        let mut present: Vec<String> = collection
            .items()
            .iter()
            .filter_map(Resource::self_uri)
            .collect();

        let mut added = Vec::new();
        for uri in uris {
            if present.contains(uri) {
                continue;
            }
            present.push(uri.clone());
            added.push(self.from_uri(uri.clone()));
        }

        if !added.is_empty() {
            let mut representation = collection.write();
            representation
                .items
                .get_or_insert_with(Vec::new)
                .extend(added.iter().cloned());
        }
        added
    }

    fn make_item(&self, item: SparseItem) -> Resource {
        match item {
            SparseItem::Uri(uri) => self.from_uri(uri),
            SparseItem::FeedItem(item) => self.from_feed_item(&item),
        }
    }

    fn attach(&self, resource: &Resource, status: Status) {
        self.store.track(resource, State::new(status));
    }
}

fn self_links(uri: Option<&str>) -> Vec<Link> {
    uri.map(|uri| vec![Link::new(rel::SELF, uri)]).unwrap_or_default()
}
