//! The shared resource handle.
//!
//! # Architecture Note
//!
//! A [`Resource`] is a cheap, cloneable handle to one in-memory representation.
//! Every holder (a parent collection, a named child slot, the caller) sees the same
//! data, so merges mutate in place and members that survive a merge keep their
//! identity. Lifecycle state is not stored here; it lives in the
//! [`StateStore`](crate::state::StateStore), keyed by [`ResourceId`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::Serialize;
use serde_json::{Map, Value};

use super::link::{self, Link};
use super::wire::LinkedDocument;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a resource handle, stable for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceId(u64);

impl ResourceId {
    fn next() -> Self {
        ResourceId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// The data behind a handle.
#[derive(Debug, Default)]
pub struct Representation {
    pub links: Vec<Link>,
    pub attributes: Map<String, Value>,
    /// `Some` for collections, even when empty.
    pub items: Option<Vec<Resource>>,
    /// Named child resources attached by the engine.
    pub children: BTreeMap<String, Resource>,
}

#[derive(Clone)]
pub struct Resource {
    id: ResourceId,
    inner: Arc<RwLock<Representation>>,
}

/// A non-owning handle, used by the state store to notice dropped resources.
#[derive(Debug, Clone)]
pub struct WeakResource {
    id: ResourceId,
    inner: Weak<RwLock<Representation>>,
}

impl WeakResource {
    pub fn upgrade(&self) -> Option<Resource> {
        self.inner.upgrade().map(|inner| Resource { id: self.id, inner })
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl Resource {
    fn from_representation(representation: Representation) -> Self {
        Self {
            id: ResourceId::next(),
            inner: Arc::new(RwLock::new(representation)),
        }
    }

    /// Creates a singleton resource.
    pub fn new(links: Vec<Link>, attributes: Map<String, Value>) -> Self {
        Self::from_representation(Representation {
            links,
            attributes,
            ..Default::default()
        })
    }

    /// Creates a collection resource.
    pub fn collection(links: Vec<Link>, items: Vec<Resource>) -> Self {
        Self::from_representation(Representation {
            links,
            items: Some(items),
            ..Default::default()
        })
    }

    pub fn from_document(document: LinkedDocument) -> Self {
        Self::new(document.links, document.attributes)
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// True when both handles point at the same representation.
    pub fn ptr_eq(&self, other: &Resource) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakResource {
        WeakResource {
            id: self.id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Representation> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Representation> {
        self.inner.write()
    }

    pub fn links(&self) -> Vec<Link> {
        self.read().links.clone()
    }

    pub fn link(&self, rel: &str) -> Option<Link> {
        link::find(&self.read().links, rel).cloned()
    }

    pub fn uri(&self, rel: &str) -> Option<String> {
        link::uri(&self.read().links, rel)
    }

    pub fn self_uri(&self) -> Option<String> {
        self.uri(link::rel::SELF)
    }

    /// The identity URI: the first of `rels` present on the resource.
    pub fn canonical_uri(&self, rels: &[String]) -> Option<String> {
        link::first_uri(&self.read().links, rels)
    }

    pub fn is_collection(&self) -> bool {
        self.read().items.is_some()
    }

    /// Snapshot of the member handles. Empty for singletons.
    pub fn items(&self) -> Vec<Resource> {
        self.read().items.clone().unwrap_or_default()
    }

    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.read().attributes.get(name).cloned()
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.write().attributes.insert(name.into(), value.into());
    }

    pub fn child(&self, name: &str) -> Option<Resource> {
        self.read().children.get(name).cloned()
    }

    /// Renders the resource (and its items and children) back into wire shape.
    pub fn to_value(&self) -> Value {
        let representation = self.read();
        let mut object = representation.attributes.clone();
        object.insert(
            "links".to_string(),
            serde_json::to_value(&representation.links).unwrap_or(Value::Null),
        );
        if let Some(items) = &representation.items {
            object.insert(
                "items".to_string(),
                Value::Array(items.iter().map(Resource::to_value).collect()),
            );
        }
        for (name, child) in &representation.children {
            object.insert(name.clone(), child.to_value());
        }
        Value::Object(object)
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Resource {}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let representation = self.read();
        let mut debug = f.debug_struct("Resource");
        debug
            .field("id", &self.id)
            .field("self", &link::uri(&representation.links, link::rel::SELF));
        if let Some(items) = &representation.items {
            debug.field("items", &items.len());
        }
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(uri: &str) -> Resource {
        let mut attributes = Map::new();
        attributes.insert("name".into(), json!("Q"));
        Resource::new(vec![Link::new("self", uri)], attributes)
    }

    #[test]
    fn clones_share_representation() {
        let a = question("https://api.example.com/q/1");
        let b = a.clone();
        b.set_attribute("name", "changed");

        assert!(a.ptr_eq(&b));
        assert_eq!(a.id(), b.id());
        assert_eq!(a.attribute("name"), Some(json!("changed")));
    }

    #[test]
    fn distinct_resources_have_distinct_ids() {
        let a = question("https://api.example.com/q/1");
        let b = question("https://api.example.com/q/1");
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn weak_handle_follows_last_strong_handle() {
        let a = question("https://api.example.com/q/1");
        let weak = a.downgrade();
        assert!(weak.upgrade().is_some_and(|r| r.ptr_eq(&a)));

        drop(a);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn renders_wire_shape() {
        let item = question("https://api.example.com/q/1");
        let collection = Resource::collection(
            vec![Link::new("self", "https://api.example.com/q")],
            vec![item],
        );

        let value = collection.to_value();
        assert_eq!(value["links"][0]["href"], "https://api.example.com/q");
        assert_eq!(value["items"][0]["name"], "Q");
        assert!(collection.is_collection());
        assert_eq!(collection.items().len(), 1);
    }
}
