//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! On non-wasm targets every adapter compiles to an inert stand-in so the workspace still builds
//! and tests natively.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Concrete host-bundle factory for the entry layer.
pub mod adapters;
pub mod storage;

pub use adapters::{build_host_services, selected_host_strategy};
pub use storage::local_storage::WebLocalStorage;
