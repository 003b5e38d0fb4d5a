//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Engine operations run inside spans named after the operation
//! (`load_resource`, `create`, `update`, `delete`, `hydrate_items`), so nested
//! item loads show up under the collection that triggered them.
//!
//! ## Levels
//!
//! - `debug`: fetch decisions, requests sent, merge statistics
//! - `info`: guarded resources skipped, classified transport errors, creates and deletes
//! - `warn`: absorbed anomalies (a `201` without `Location`, a failed create)
//! - `error`: transport failures nobody could classify
//!
//! ## Usage Examples
//!
//! ```bash
//! # Skips and classified errors only
//! RUST_LOG=linked_sync=info cargo test
//!
//! # Every fetch decision
//! RUST_LOG=linked_sync::state=debug,linked_sync::sync=debug cargo test
//! ```
//!
//! ## Workflow Trace Example
//!
//! Loading a feed of two questions with `include_items`, with `RUST_LOG=debug`:
//!
//! ```text
//! DEBUG load_resource: Fetch decision from state status=locationOnly fetch=true
//! DEBUG load_resource: Sending request uri=https://api.example.com/question
//! DEBUG load_resource: Collection merged kept=0 added=2 removed=0
//! DEBUG load_resource:hydrate_items: Loading items concurrently count=2
//! DEBUG load_resource:hydrate_items:load_resource: Sending request uri=https://api.example.com/question/a
//! DEBUG load_resource:hydrate_items:load_resource: Sending request uri=https://api.example.com/question/b
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Panics if one is already set.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

/// Like [`setup_tracing`], but leaves an existing subscriber in place.
///
/// Returns `false` when a subscriber was already installed.
pub fn try_setup_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}
