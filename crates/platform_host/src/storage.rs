//! Key/value persistence contracts.

pub mod error;
pub mod key_value;
