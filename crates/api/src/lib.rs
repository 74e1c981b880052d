//! HTTP API: request authentication/authorization gates and route wiring.

pub mod access;
pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
