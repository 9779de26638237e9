//! OIDC provider registry
//!
//! Durable records describing which identity providers a tenant trusts,
//! with their allowed client ids and certificate thumbprints.

mod provider;
mod registry;

pub use provider::OidcProvider;
pub use registry::ProviderRegistry;
