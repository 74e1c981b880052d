//! `gatehouse-auth`: token verification and role-based access policy.
//!
//! This crate is intentionally decoupled from HTTP and from any concrete
//! revocation store: transports call [`TokenVerifier::verify`] and
//! [`authorize`], storage plugs in through [`RevocationRegistry`].

pub mod authorize;
pub mod claims;
pub mod key;
pub mod policy;
pub mod principal;
pub mod revocation;
pub mod roles;
pub mod token;

pub use authorize::{authorize, AuthzError, Grant};
pub use claims::Claims;
pub use key::{KeyError, SigningKey, MIN_KEY_LEN};
pub use policy::{AccessPolicy, Declarations, RouteAccess};
pub use principal::Principal;
pub use revocation::{InMemoryRevocationRegistry, RevocationError, RevocationRegistry};
pub use roles::Role;
pub use token::{IssuedToken, SigningError, TokenSigner, TokenVerifier, VerificationError};

pub use gatehouse_core::{SubjectId, TokenId};
