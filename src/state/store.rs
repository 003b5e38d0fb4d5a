//! Per-resource lifecycle state and the side table that holds it.
//!
//! # Architecture Note
//!
//! State never travels on the wire, so it is kept out of the representation
//! entirely. The [`StateStore`] maps a [`ResourceId`] to its [`State`] and holds
//! only a weak handle to the resource: when the host drops the last strong
//! handle the entry becomes prunable.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

use super::{Headers, Status};
use crate::model::{Resource, ResourceId, WeakResource};

/// Side metadata for one tracked resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub status: Option<Status>,
    pub previous_status: Option<Status>,
    /// Headers of the last response.
    pub headers: Headers,
    /// When the resource was last retrieved.
    pub retrieved: Option<DateTime<Utc>>,
    /// Names of tracked child resources.
    pub singleton: BTreeSet<String>,
    /// Names of tracked child collections.
    pub collection: BTreeSet<String>,
}

impl State {
    pub fn new(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Moves to `to`, remembering the status it leaves.
    pub fn transition(&mut self, to: Status) {
        self.previous_status = self.status;
        self.status = Some(to);
    }

    /// Records the metadata of a response received at `now`.
    pub fn record_response(&mut self, headers: Headers, now: DateTime<Utc>) {
        self.headers = headers;
        self.retrieved = Some(now);
    }

    /// A record with no status always needs a fetch.
    pub fn needs_fetch_from_state(&self, force_load: bool) -> bool {
        match self.status {
            Some(status) => {
                let fetch = matches!(status, Status::LocationOnly | Status::Stale)
                    || (force_load && status == Status::Hydrated);
                debug!(%status, fetch, "Fetch decision from state");
                fetch
            }
            None => {
                warn!("Status not found on state, fetching");
                true
            }
        }
    }

    /// True once the last response's `expires` lies in the past.
    pub fn needs_fetch_from_headers(&self, now: DateTime<Utc>) -> bool {
        let Some(raw) = self.headers.get("expires") else {
            return false;
        };
        match self.headers.expires() {
            Some(expires) => {
                let fetch = now > expires;
                debug!(%expires, fetch, "Fetch decision from headers");
                fetch
            }
            // `Expires: 0` and other invalid dates mean already expired.
            None => {
                debug!(expires = raw, "Unparseable expires, treating as expired");
                true
            }
        }
    }

    pub fn needs_fetch(&self, force_load: bool, now: DateTime<Utc>) -> bool {
        self.needs_fetch_from_state(force_load) || self.needs_fetch_from_headers(now)
    }

    pub fn is_tracked_child(&self, name: &str) -> bool {
        self.singleton.contains(name) || self.collection.contains(name)
    }
}

struct Entry {
    handle: WeakResource,
    state: State,
}

/// Holds the [`State`] of every tracked resource.
#[derive(Default)]
pub struct StateStore {
    entries: RwLock<HashMap<ResourceId, Entry>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `state` to `resource`, replacing any previous record.
    pub fn track(&self, resource: &Resource, state: State) {
        self.entries.write().insert(
            resource.id(),
            Entry {
                handle: resource.downgrade(),
                state,
            },
        );
    }

    pub fn is_tracked(&self, resource: &Resource) -> bool {
        self.entries.read().contains_key(&resource.id())
    }

    /// A snapshot of the resource's state.
    pub fn get(&self, resource: &Resource) -> Option<State> {
        self.entries
            .read()
            .get(&resource.id())
            .map(|entry| entry.state.clone())
    }

    pub fn status(&self, resource: &Resource) -> Option<Status> {
        self.entries
            .read()
            .get(&resource.id())
            .and_then(|entry| entry.state.status)
    }

    /// Mutates the state in place. Returns `None` for untracked resources.
    pub fn update<R>(&self, resource: &Resource, f: impl FnOnce(&mut State) -> R) -> Option<R> {
        self.entries
            .write()
            .get_mut(&resource.id())
            .map(|entry| f(&mut entry.state))
    }

    pub fn transition(&self, resource: &Resource, to: Status) -> bool {
        self.update(resource, |state| state.transition(to)).is_some()
    }

    /// Drops records whose resource is no longer held anywhere. Returns how many went.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.handle.is_alive());
        let pruned = before - entries.len();
        if pruned > 0 {
            debug!(pruned, remaining = entries.len(), "Pruned state");
        }
        pruned
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
