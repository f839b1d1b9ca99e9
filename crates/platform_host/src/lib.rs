//! Host-neutral storage and clock contracts shared by the workspace runtime and browser adapters.
//!
//! Concrete browser bindings live in `platform_host_web`; this crate only defines the
//! synchronous key/value boundary, its error taxonomy, and test doubles.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod storage;
pub mod time;

pub use host::{HostServices, HostStrategy};
pub use storage::error::StorageError;
pub use storage::key_value::{load_typed_with, KeyValueStore, MemoryKeyValueStore};
pub use time::{unix_time_ms_now, Clock, SystemClock};
