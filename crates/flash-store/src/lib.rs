//! Flash Store
//!
//! Owns every session created during the process lifetime and applies
//! partial updates to individual artifacts by id.
//!
//! # Concurrency
//!
//! Many generation tasks write concurrently, each to its own artifact. Every
//! write is "replace this field of this identified artifact", applied under
//! the owning session's entry lock, so interleaved writes to siblings never
//! clobber each other.

#![warn(unreachable_pub)]

mod error;
mod store;

pub use error::StoreError;
pub use store::{SessionStore, StoreEvent, DEFAULT_EVENT_CAPACITY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
