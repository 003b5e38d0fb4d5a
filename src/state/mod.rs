//! Resource lifecycle: status, response headers and the state store.

pub mod headers;
pub mod status;
pub mod store;

pub use headers::Headers;
pub use status::Status;
pub use store::{State, StateStore};
