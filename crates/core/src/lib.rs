//! `gatehouse-core`: identifiers and error primitives shared by the gateway crates.
//!
//! This crate contains no HTTP, crypto or storage concerns.

pub mod error;
pub mod id;

pub use error::IdError;
pub use id::{SubjectId, TokenId};
