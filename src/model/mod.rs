//! Resource model: links, wire documents and the shared in-memory handle.

pub mod link;
pub mod resource;
pub mod wire;

pub use link::{rel, Link};
pub use resource::{Representation, Resource, ResourceId, WeakResource};
pub use wire::{CollectionDocument, Feed, FeedItem, LinkedDocument, Payload};
