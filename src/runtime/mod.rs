//! Runtime support for hosts embedding the engine.
//!
//! - [`setup_tracing`] / [`try_setup_tracing`] - initialize the tracing/logging infrastructure

pub mod tracing;

pub use self::tracing::*;
