//! Building and merging in-memory representations.

pub mod collection_merger;
pub mod singleton_merger;
pub mod sparse;

pub use collection_merger::{CollectionMerger, MergeStats};
pub use singleton_merger::SingletonMerger;
pub use sparse::{SparseFactory, SparseItem, SparseOptions, SparseType};
