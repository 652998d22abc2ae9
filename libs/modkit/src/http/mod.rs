//! Outgoing HTTP utilities.

pub mod client;
pub mod trace_context;
