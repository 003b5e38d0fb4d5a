//! Merging a response into an existing singleton, and attaching named children.

use serde_json::{Map, Value};
use tracing::debug;

use crate::model::{Link, Resource};
use crate::state::StateStore;

pub struct SingletonMerger;

impl SingletonMerger {
    /// Overwrites the attributes present in `attributes`; attributes the response
    /// does not mention are kept. `links`, when given, replaces the link list
    /// wholesale, even when it is empty.
    pub fn merge(target: &Resource, links: Option<Vec<Link>>, attributes: Map<String, Value>) {
        let mut representation = target.write();
        if let Some(links) = links {
            representation.links = links;
        }
        for (name, value) in attributes {
            representation.attributes.insert(name, value);
        }
    }

    /// Assigns `child` to `target` under `name` and records the name on the target's
    /// state, as a collection or a singleton depending on the child's shape.
    pub fn add(store: &StateStore, target: &Resource, name: &str, child: Resource) -> Resource {
        let is_collection = child.is_collection();
        store.update(target, |state| {
            if is_collection {
                state.singleton.remove(name);
                state.collection.insert(name.to_string());
            } else {
                state.collection.remove(name);
                state.singleton.insert(name.to_string());
            }
        });
        debug!(name, is_collection, "Child added");
        target.write().children.insert(name.to_string(), child.clone());
        child
    }
}
