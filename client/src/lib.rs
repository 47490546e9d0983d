//! Caseline client library.
//!
//! Owns the authenticated-session lifecycle for the Caseline
//! case-management service and exposes typed gateways for the domain
//! endpoints the screens consume. The hexagon keeps transport and
//! persistence at the edges: [`domain`] holds entities, services, and
//! ports; [`outbound`] holds the reqwest and file-store adapters.

pub mod domain;
pub mod outbound;
