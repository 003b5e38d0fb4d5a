//! Per-call options.

use crate::model::rel;
use crate::state::Status;
use crate::transport::RequestOptions;

/// Options accepted by every [`SyncEngine`](crate::SyncEngine) operation.
///
/// # Example
/// ```
/// use linked_sync::SyncOptions;
///
/// let options = SyncOptions::default().force_load().include_items().sequential();
/// assert_eq!(options.rel, "self");
/// assert_eq!(options.batch_size, Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Link relation to follow on the resource.
    pub rel: String,
    /// Fetch even when the resource is already hydrated.
    pub force_load: bool,
    /// With `force_load`, reload the collection but not its items.
    pub force_load_feed_only: bool,
    /// Hydrate the members of a collection after loading it.
    pub include_items: bool,
    /// Overrides the configured batch size: `> 0` concurrent, `0` sequential.
    pub batch_size: Option<usize>,
    /// Initial status for resources created during the call.
    pub status: Option<Status>,
    /// Target URI used instead of resolving `rel`.
    pub uri: Option<String>,
    /// Media type to request from the transport.
    pub media_type: Option<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            rel: rel::SELF.to_string(),
            force_load: false,
            force_load_feed_only: false,
            include_items: false,
            batch_size: None,
            status: None,
            uri: None,
            media_type: None,
        }
    }
}

impl SyncOptions {
    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = rel.into();
        self
    }

    pub fn force_load(mut self) -> Self {
        self.force_load = true;
        self
    }

    pub fn force_load_feed_only(mut self) -> Self {
        self.force_load = true;
        self.force_load_feed_only = true;
        self
    }

    pub fn include_items(mut self) -> Self {
        self.include_items = true;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Hydrate items one after another.
    pub fn sequential(self) -> Self {
        self.with_batch_size(0)
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Options for loading the members of a collection loaded with `self`.
    pub(crate) fn for_items(&self) -> Self {
        let mut options = self.clone();
        options.rel = rel::SELF.to_string();
        options.uri = None;
        if self.force_load && self.force_load_feed_only {
            options.force_load = false;
        }
        options
    }

    pub(crate) fn request_options(&self) -> RequestOptions {
        RequestOptions {
            accept: self.media_type.clone(),
        }
    }
}
