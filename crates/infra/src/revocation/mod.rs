//! Revocation registry adapters backed by external stores.

pub mod postgres;

pub use postgres::PostgresRevocationRegistry;
