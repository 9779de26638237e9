//! websts: Security token service core
//!
//! Validates web-identity (OIDC) tokens against a registry of trusted
//! identity providers and exchanges them for temporary assumed-role
//! credentials. This crate contains the provider registry and the
//! authentication engine only; it depends on abstract collaborator traits
//! (Store, Clock, SignatureVerifier, CredentialsIssuer, Environment) and
//! never imports storage- or transport-specific code.

pub mod arn;
pub mod auth;
pub mod config;
pub mod error;
pub mod oidc;
pub mod params;
pub mod platform;
pub mod sts;

#[cfg(test)]
pub mod test_support;
