#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Linked Sync
//!
//! > **Keep an in-memory graph of hypermedia resources in step with the server.**
//!
//! Consumers read and mutate linked resources through a [`SyncEngine`] instead of
//! issuing raw HTTP calls. The engine decides when a fetch is needed, merges what
//! comes back into the objects the caller already holds, and records each
//! resource's lifecycle in a side table.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Fetch as little as possible
//! A resource starts life knowing only its URI (`locationOnly`). Once `hydrated` it
//! is not fetched again unless the caller forces it, it is marked `stale`, or the
//! server's `expires` header has passed.
//!
//! ### Never lose what was already fetched
//! Collection merges are keyed by canonical URI. Members present before and after
//! keep their handle and their hydrated data; only genuinely new members arrive
//! as sparse placeholders.
//!
//! ## 🚀 Core Concepts
//!
//! ### Shared handles
//! A [`Resource`] is a cloneable handle. Every holder sees the same data, so merges
//! mutate in place.
//!
//! ### State lives beside the data
//! [`State`] (status, headers, retrieval time, tracked children) is kept in a
//! [`StateStore`] keyed by resource id. The resource itself stays serializable.
//!
//! ### Mocking: Testing without a server
//! [`MockTransport`](transport::MockTransport) scripts responses per URI and records
//! the order requests started and finished in.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Errors
//! Contract violations (a missing link relation, an untracked resource, updating a
//! collection) fail immediately with [`SyncError`]. Transport failures are absorbed
//! into the resource's status by the [`Classification`] step, except a `404`, which
//! marks the resource `deleted` *and* is raised.
//!
//! ### 2. Concurrency Model
//! Operations suspend only at the transport and while hydrating collection items.
//! Item hydration is concurrent by default; set a batch size of `0` for strictly
//! sequential loads. No lock is held across an `.await`.
//!
//! ### 3. Observability
//! Every operation runs in a `tracing` span. See the [`runtime::tracing`] module.
//!
//! ## 🗺️ Module Tour
//!
//! - [`model`]: links, wire documents ([`Payload`]) and the [`Resource`] handle.
//! - [`state`]: [`Status`], [`Headers`], [`State`] and the [`StateStore`].
//! - [`representation`]: the [`SparseFactory`] and the singleton/collection mergers.
//! - [`sync`]: the [`SyncEngine`], batch hydration and error classification.
//! - [`transport`]: the [`Transport`] boundary and its mock.
//! - [`config`]: [`EngineConfig`].
//!
//! ### Running Tests
//!
//! ```bash
//! RUST_LOG=debug cargo test
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod representation;
pub mod runtime;
pub mod state;
pub mod sync;
pub mod transport;

pub use config::EngineConfig;
pub use error::{SyncError, SyncResult};
pub use model::{Link, Payload, Resource};
pub use representation::{SparseFactory, SparseOptions};
pub use state::{Headers, State, StateStore, Status};
pub use sync::{Classification, ItemSelector, SyncEngine, SyncOptions};
pub use transport::{Response, Transport, TransportError};
