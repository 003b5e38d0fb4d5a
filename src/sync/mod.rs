//! Orchestration: load, create, update and delete against a [`Transport`](crate::transport::Transport).

pub mod classify;
pub mod engine;
mod hydrate;
pub mod options;

pub use classify::Classification;
pub use engine::{ItemSelector, SyncEngine};
pub use options::SyncOptions;
