//! Reconciling a collection's members with an incoming listing.
//!
//! Members are keyed solely by their canonical (or self) URI:
//! - existing members missing from the incoming set are removed;
//! - incoming members missing from the existing set are appended;
//! - members in both keep their handle, state and hydrated data.

use std::collections::HashSet;

use tracing::debug;

use crate::model::{Link, Resource};

/// What a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub kept: usize,
    pub added: usize,
    pub removed: usize,
}

pub struct CollectionMerger<'a> {
    canonical_rels: &'a [String],
}

impl<'a> CollectionMerger<'a> {
    pub fn new(canonical_rels: &'a [String]) -> Self {
        Self { canonical_rels }
    }

    /// Merges `incoming` members, each paired with its identity URI, into `target`.
    ///
    /// `build` runs only for members not already present, so a refresh of an
    /// unchanged collection creates nothing. `links`, when given, replaces the
    /// collection's own links wholesale.
    pub fn merge<T>(
        &self,
        target: &Resource,
        links: Option<Vec<Link>>,
        incoming: Vec<(String, T)>,
        mut build: impl FnMut(T) -> Resource,
    ) -> MergeStats {
        let existing = target.items();

        let incoming_keys: HashSet<String> = incoming.iter().map(|(key, _)| key.clone()).collect();

        let mut stats = MergeStats::default();
        let mut merged = Vec::with_capacity(incoming.len());
        let mut seen = HashSet::new();

        for item in existing {
            match self.key(&item) {
                Some(key) if incoming_keys.contains(&key) && seen.insert(key.clone()) => {
                    stats.kept += 1;
                    merged.push(item);
                }
                _ => stats.removed += 1,
            }
        }

        for (key, seed) in incoming {
            if seen.insert(key) {
                stats.added += 1;
                merged.push(build(seed));
            }
        }

        let mut representation = target.write();
        if let Some(links) = links {
            representation.links = links;
        }
        representation.items = Some(merged);
        drop(representation);

        debug!(kept = stats.kept, added = stats.added, removed = stats.removed, "Collection merged");
        stats
    }

    /// Removes the member sharing `item`'s identity URI and returns it.
    pub fn remove(&self, target: &Resource, item: &Resource) -> Option<Resource> {
        let key = self.key(item)?;
        let mut representation = target.write();
        let items = representation.items.as_mut()?;
        let position = items
            .iter()
            .position(|candidate| self.key(candidate).as_deref() == Some(key.as_str()))?;
        Some(items.remove(position))
    }

    /// Finds the member whose identity URI is `uri`.
    pub fn find(&self, target: &Resource, uri: &str) -> Option<Resource> {
        target
            .items()
            .into_iter()
            .find(|item| self.key(item).as_deref() == Some(uri))
    }

    fn key(&self, resource: &Resource) -> Option<String> {
        resource.canonical_uri(self.canonical_rels)
    }
}
