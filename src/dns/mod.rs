//! DNS resolution.
//!
//! Forward lookups (A/AAAA) through `hickory-resolver`, behind the
//! `HostResolver` trait.

mod resolution;

// Re-export public API
pub use resolution::{resolve_host_to_ip, HostResolver};
