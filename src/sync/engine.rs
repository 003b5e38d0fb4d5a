//! # Synchronization Engine
//!
//! Every operation follows the same shape:
//!
//! 1. resolve the link to follow (relation `self` unless told otherwise);
//! 2. guard on the resource's status;
//! 3. decide whether the server has to be contacted at all;
//! 4. call the [`Transport`];
//! 5. update the resource's [`State`] and merge the payload in place.
//!
//! Transport failures are classified into state (see [`Classification`]). Only a
//! `404` on load, update or delete surfaces as an error.

use std::sync::Arc;

use chrono::Utc;
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::classify::Classification;
use super::SyncOptions;
use crate::config::EngineConfig;
use crate::error::{SyncError, SyncResult};
use crate::model::{link, rel, Link, Payload, Resource};
use crate::representation::{CollectionMerger, SingletonMerger, SparseFactory, SparseOptions};
use crate::state::{State, StateStore, Status};
use crate::transport::Transport;

/// Selects one member of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSelector {
    /// By canonical or self URI.
    Uri(String),
    /// By the value of the mapped title attribute.
    Title(String),
}

/// Keeps an in-memory resource graph in step with the server.
///
/// # Example
/// ```ignore
/// let engine = SyncEngine::new(transport);
/// let questions = engine.factory().collection_from_uri("https://api.example.com/questions");
///
/// engine.load(&questions, &SyncOptions::default().include_items()).await?;
/// assert_eq!(engine.status(&questions), Some(Status::Hydrated));
/// ```
pub struct SyncEngine {
    pub(super) transport: Arc<dyn Transport>,
    pub(super) store: Arc<StateStore>,
    pub(super) factory: SparseFactory,
    pub(super) config: EngineConfig,
}

impl SyncEngine {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_config(transport, EngineConfig::default())
    }

    pub fn with_config(transport: impl Transport + 'static, config: EngineConfig) -> Self {
        let store = Arc::new(StateStore::new());
        let factory = SparseFactory::new(store.clone(), config.mapped_title.clone());
        Self {
            transport: Arc::new(transport),
            store,
            factory,
            config,
        }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// The factory for sparse resources tracked by this engine.
    pub fn factory(&self) -> &SparseFactory {
        &self.factory
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status(&self, resource: &Resource) -> Option<Status> {
        self.store.status(resource)
    }

    pub fn state(&self, resource: &Resource) -> Option<State> {
        self.store.get(resource)
    }

    /// Forgets the state of resources nobody holds any more.
    pub fn prune(&self) -> usize {
        self.store.prune()
    }

    /// Brings `resource` up to date, fetching only when its state or headers say so.
    ///
    /// A plain resource that is not yet tracked is adopted on first use when it has
    /// a self link. Collections loaded with `include_items` also hydrate their members,
    /// even when the collection itself did not need a fetch.
    pub fn load<'a>(
        &'a self,
        resource: &'a Resource,
        options: &'a SyncOptions,
    ) -> BoxFuture<'a, SyncResult<Resource>> {
        Box::pin(self.load_resource(resource, options))
    }

    #[instrument(skip_all, fields(resource = %resource.id(), rel = %options.rel))]
    async fn load_resource(&self, resource: &Resource, options: &SyncOptions) -> SyncResult<Resource> {
        self.ensure_tracked(resource)?;
        let state = self.store.get(resource).unwrap_or_default();

        if let Some(status) = state.status.filter(|status| status.is_guarded()) {
            info!(%status, uri = ?resource.self_uri(), "Resource is guarded and will not be fetched");
            return Ok(resource.clone());
        }

        let link = self.resolve(resource, options)?;
        let now = Utc::now();

        if state.needs_fetch(options.force_load, now) {
            debug!(uri = %link.href, "Sending request");
            match self.transport.load(&link, &options.request_options()).await {
                Ok(response) => {
                    self.store.update(resource, |state| {
                        state.record_response(response.headers, now);
                        state.transition(Status::Hydrated);
                    });
                    self.process(resource, response.data, options).await?;
                }
                Err(err) => Classification::classify(&err).apply(&self.store, resource, &link.href)?,
            }
        } else if resource.is_collection() && options.include_items {
            self.hydrate_items(resource, options).await?;
        }

        Ok(resource.clone())
    }

    /// POSTs `document` to the link resolved on `context` and loads what the server created.
    ///
    /// Returns `None` for anything but a `201` with a `Location`, and for transport
    /// failures, which are logged and otherwise ignored.
    #[instrument(skip_all, fields(context = %context.id(), rel = %options.rel))]
    pub async fn create(
        &self,
        context: &Resource,
        document: &Value,
        options: &SyncOptions,
    ) -> SyncResult<Option<Resource>> {
        let link = self.resolve(context, options)?;
        debug!(uri = %link.href, ?document, "Sending request");

        let response = match self.transport.create(&link, document, &options.request_options()).await {
            Ok(response) => response,
            Err(err) => {
                warn!(uri = %link.href, error = %err, "Create failed, nothing created");
                return Ok(None);
            }
        };

        if response.status != 201 {
            warn!(status = response.status, "Create returned no resource to process");
            return Ok(None);
        }

        let Some(location) = response.headers.location() else {
            warn!(uri = %link.href, "Create returned no location");
            return Ok(None);
        };

        let created = self.factory.make(
            SparseOptions::new()
                .with_uri(location)
                .with_status(options.status.unwrap_or(Status::LocationOnly)),
        );
        let load_options = SyncOptions {
            rel: rel::SELF.to_string(),
            uri: None,
            ..options.clone()
        };
        self.load(&created, &load_options).await?;
        info!(uri = location, "Created");
        Ok(Some(created))
    }

    /// PUTs `document` and merges the result into `resource` in place.
    ///
    /// The response body is merged when the server returns one, otherwise the sent
    /// document is. A `null` document does nothing.
    #[instrument(skip_all, fields(resource = %resource.id(), rel = %options.rel))]
    pub async fn update(
        &self,
        resource: &Resource,
        document: &Value,
        options: &SyncOptions,
    ) -> SyncResult<Resource> {
        if !self.store.is_tracked(resource) {
            return Err(SyncError::untracked(resource.self_uri()));
        }
        if resource.is_collection() {
            return Err(SyncError::Unsupported("update collection".to_string()));
        }
        if document.is_null() {
            info!("No document to update");
            return Ok(resource.clone());
        }

        let link = self.resolve(resource, options)?;
        debug!(uri = %link.href, ?document, "Sending request");

        match self.transport.update(&link, document, &options.request_options()).await {
            Ok(response) => {
                let now = Utc::now();
                self.store.update(resource, |state| {
                    state.record_response(response.headers, now);
                    state.transition(Status::Hydrated);
                });
                let payload = match response.data {
                    Some(data) => data,
                    // A sent document without links leaves the resource's links alone.
                    None => match Payload::from_value(document.clone())? {
                        Payload::Singleton(mut sent) if sent.links.is_empty() => {
                            sent.links = resource.links();
                            Payload::Singleton(sent)
                        }
                        sent => sent,
                    },
                };
                self.process(resource, Some(payload), options).await?;
            }
            Err(err) => Classification::classify(&err).apply(&self.store, resource, &link.href)?,
        }
        Ok(resource.clone())
    }

    /// DELETEs `resource`. On success it stays in memory with status `deleted`.
    #[instrument(skip_all, fields(resource = %resource.id(), rel = %options.rel))]
    pub async fn delete(&self, resource: &Resource, options: &SyncOptions) -> SyncResult<Resource> {
        let Some(status) = self.store.status(resource) else {
            return Err(SyncError::untracked(resource.self_uri()));
        };
        if status.is_guarded() {
            info!(%status, uri = ?resource.self_uri(), "Resource is guarded and will not be deleted");
            return Ok(resource.clone());
        }

        let link = self.resolve(resource, options)?;
        self.store.transition(resource, Status::DeleteInProgress);
        debug!(uri = %link.href, "Sending request");

        match self.transport.delete(&link, &options.request_options()).await {
            Ok(response) => {
                let now = Utc::now();
                self.store.update(resource, |state| {
                    state.transition(Status::Deleted);
                    state.record_response(response.headers, now);
                });
                info!(uri = %link.href, "Deleted");
            }
            Err(err) => Classification::classify(&err).apply(&self.store, resource, &link.href)?,
        }
        Ok(resource.clone())
    }

    /// Drops the member of `collection` sharing `item`'s identity and marks it stale.
    pub fn remove_collection_item(&self, collection: &Resource, item: &Resource) -> Option<Resource> {
        let removed = CollectionMerger::new(&self.config.canonical_rels).remove(collection, item)?;
        self.store.transition(&removed, Status::Stale);
        debug!(uri = ?removed.self_uri(), "Removed from collection");
        Some(removed)
    }

    /// Refreshes `collection`, then loads the one member matching `selector`.
    #[instrument(skip_all, fields(collection = %collection.id(), ?selector))]
    pub async fn load_item(
        &self,
        collection: &Resource,
        selector: &ItemSelector,
        options: &SyncOptions,
    ) -> SyncResult<Option<Resource>> {
        let collection_options = SyncOptions {
            include_items: false,
            ..options.clone()
        };
        self.load(collection, &collection_options).await?;

        let found = match selector {
            ItemSelector::Uri(uri) => CollectionMerger::new(&self.config.canonical_rels).find(collection, uri),
            ItemSelector::Title(title) => collection.items().into_iter().find(|item| {
                item.attribute(&self.config.mapped_title)
                    .is_some_and(|value| value.as_str() == Some(title.as_str()))
            }),
        };

        match found {
            Some(item) => Ok(Some(self.load(&item, &options.for_items()).await?)),
            None => {
                debug!("No matching item");
                Ok(None)
            }
        }
    }

    /// Follows `rel` from `parent` to a named child, creating the child on first use,
    /// and loads it. The child is attached to `parent` under the camel-cased relation.
    #[instrument(skip_all, fields(parent = %parent.id(), %relation))]
    pub async fn load_named(
        &self,
        parent: &Resource,
        relation: &str,
        options: &SyncOptions,
    ) -> SyncResult<Resource> {
        self.ensure_tracked(parent)?;
        let uri = parent
            .uri(relation)
            .ok_or_else(|| SyncError::missing_link(relation, parent.self_uri()))?;
        let name = camel_case(relation);

        let child = self.factory.add_child_from_uri(parent, &name, &uri);
        let child_options = SyncOptions {
            rel: rel::SELF.to_string(),
            uri: None,
            ..options.clone()
        };
        self.load(&child, &child_options).await?;

        // A feed may have turned the child into a collection.
        SingletonMerger::add(&self.store, parent, &name, child.clone());
        Ok(child)
    }

    /// Routes a payload to the merger for its shape.
    pub(super) async fn process(
        &self,
        resource: &Resource,
        data: Option<Payload>,
        options: &SyncOptions,
    ) -> SyncResult<()> {
        let merger = CollectionMerger::new(&self.config.canonical_rels);
        let stats = match data {
            None => {
                debug!("Empty response, nothing to merge");
                return Ok(());
            }
            Some(Payload::Singleton(document)) => {
                SingletonMerger::merge(resource, Some(document.links), document.attributes);
                return Ok(());
            }
            Some(Payload::Feed(feed)) => {
                let incoming = feed
                    .items
                    .into_iter()
                    .map(|item| (item.id.clone(), item))
                    .collect();
                merger.merge(resource, Some(feed.links), incoming, |item| {
                    self.factory.from_feed_item(&item)
                })
            }
            Some(Payload::Collection(document)) => {
                let incoming = document
                    .items
                    .into_iter()
                    .filter_map(|item| Some((link::first_uri(&item.links, &self.config.canonical_rels)?, item)))
                    .collect();
                let stats = merger.merge(resource, Some(document.links), incoming, |item| {
                    self.factory.from_document(item, Status::Hydrated)
                });
                SingletonMerger::merge(resource, None, document.attributes);
                stats
            }
        };

        // Members dropped by the merge take their state with them.
        if stats.removed > 0 {
            self.store.prune();
        }

        if options.include_items {
            self.hydrate_items(resource, options).await?;
        }
        Ok(())
    }

    fn ensure_tracked(&self, resource: &Resource) -> SyncResult<()> {
        if self.store.is_tracked(resource) {
            return Ok(());
        }
        match resource.self_uri() {
            Some(uri) => {
                debug!(%uri, "Tracking resource on first load");
                self.factory.wrap(resource, Status::LocationOnly);
                Ok(())
            }
            None => Err(SyncError::untracked(None)),
        }
    }

    fn resolve(&self, resource: &Resource, options: &SyncOptions) -> SyncResult<Link> {
        if let Some(uri) = &options.uri {
            return Ok(Link::new(options.rel.clone(), uri.clone()));
        }
        resource
            .link(&options.rel)
            .ok_or_else(|| SyncError::missing_link(options.rel.clone(), resource.self_uri()))
    }
}

/// `edit-form` becomes `editForm`.
fn camel_case(rel: &str) -> String {
    let mut name = String::with_capacity(rel.len());
    let mut upper = false;
    for c in rel.chars() {
        if c == '-' || c == '_' || c == ' ' {
            upper = !name.is_empty();
        } else if upper {
            name.extend(c.to_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}
