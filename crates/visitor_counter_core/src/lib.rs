//! Shared visitor counter domain primitives.
//!
//! This crate owns the counter record contract, the response envelope returned
//! to the hosting layer, configuration, and the error taxonomy. It intentionally
//! excludes AWS SDK and Lambda runtime concerns.

pub mod config;
pub mod contract;
pub mod error;
