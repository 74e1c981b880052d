use crate::access::{Operation, SecuredRouter};

pub mod admin;
pub mod system;

/// Every route of the service, with its access declarations.
pub fn router() -> SecuredRouter {
    SecuredRouter::new()
        .route(Operation::get("/health", system::health))
        .route(Operation::get("/whoami", system::whoami).unrestricted())
        .resource(admin::resource())
}
