//! Driven adapters for the domain ports.
//!
//! Adapters own infrastructure detail only: HTTP transport against the
//! remote API ([`http`]) and file-backed persistence for the durable
//! store ([`store`]). Domain code never imports from here; the
//! composition root wires adapters to ports.

pub mod http;
pub mod store;
