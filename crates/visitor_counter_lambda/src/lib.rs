//! AWS-oriented adapters and handlers for the visitor counter functions.
//!
//! This crate owns runtime integration details (Lambda handlers, invocation
//! routing, and the record store adapters). Domain contracts live in
//! `visitor_counter_core`.

pub mod adapters;
pub mod handlers;
pub mod invocation;
