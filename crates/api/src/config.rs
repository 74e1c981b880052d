//! Gateway configuration, read once at startup.
//!
//! | Variable                          | Default        |
//! |-----------------------------------|----------------|
//! | `GATEHOUSE_BIND_ADDR`             | `0.0.0.0:8080` |
//! | `GATEHOUSE_SIGNING_KEY`           | required       |
//! | `GATEHOUSE_TOKEN_HEADER`          | `X-Auth-Token` |
//! | `GATEHOUSE_TRUST_FORWARDED_PROTO` | `false`        |
//! | `DATABASE_URL`                    | unset          |

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use gatehouse_auth::{KeyError, SigningKey};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Tokens travel in this header rather than `Authorization: Bearer`; the
/// whole header value is the token.
pub const DEFAULT_TOKEN_HEADER: &str = "x-auth-token";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("GATEHOUSE_SIGNING_KEY is unusable: {0}")]
    Key(#[from] KeyError),
}

/// Settings consumed by the request gates.
#[derive(Debug, Clone)]
pub struct GateSettings {
    pub token_header: HeaderName,
    pub trust_forwarded_proto: bool,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            token_header: HeaderName::from_static(DEFAULT_TOKEN_HEADER),
            trust_forwarded_proto: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub signing_key: SigningKey,
    pub gate: GateSettings,
    pub database_url: Option<String>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    ///
    /// There is deliberately no fallback signing key: a generated key would
    /// invalidate outstanding tokens on every restart.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = var("GATEHOUSE_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "GATEHOUSE_BIND_ADDR",
                reason: e.to_string(),
            })?;

        let raw_key = var("GATEHOUSE_SIGNING_KEY").ok_or(ConfigError::Missing("GATEHOUSE_SIGNING_KEY"))?;
        let signing_key = SigningKey::from_bytes(raw_key.into_bytes())?;

        let token_header = match var("GATEHOUSE_TOKEN_HEADER") {
            Some(name) => HeaderName::try_from(name.trim()).map_err(|e| ConfigError::Invalid {
                var: "GATEHOUSE_TOKEN_HEADER",
                reason: e.to_string(),
            })?,
            None => HeaderName::from_static(DEFAULT_TOKEN_HEADER),
        };

        let trust_forwarded_proto = match var("GATEHOUSE_TRUST_FORWARDED_PROTO") {
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::Invalid {
                var: "GATEHOUSE_TRUST_FORWARDED_PROTO",
                reason: format!("expected true/false, got '{v}'"),
            })?,
            None => false,
        };

        Ok(Self {
            bind_addr,
            signing_key,
            gate: GateSettings {
                token_header,
                trust_forwarded_proto,
            },
            database_url: var("DATABASE_URL"),
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
