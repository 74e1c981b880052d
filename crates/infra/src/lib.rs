//! Infrastructure adapters for the gateway (external stores).

pub mod revocation;

pub use revocation::PostgresRevocationRegistry;
