//! Collaborator abstraction traits
//!
//! These traits define the boundary between the STS core and its external
//! collaborators: the object-storage backend holding provider records, the
//! JWT signature primitives, the credential minter, and the deployment
//! environment. The core never imports a concrete implementation.

use async_trait::async_trait;

use crate::auth::web_token::WebTokenHeader;
use crate::auth::Identity;
use crate::error::Result;
use crate::sts::{AssumeRoleWithWebIdentityRequest, Credentials};

/// One page of a prefix listing
pub struct Listing {
    pub keys: Vec<String>,
    pub next_cursor: Option<String>,
    pub truncated: bool,
}

/// Object-storage backend with pool-scoped get/put/delete/list semantics.
///
/// `put` with `exclusive` set is a conditional create with at-most-one
/// winner; it fails `AlreadyExists` when the key is present. `get` fails
/// `NotFound` for a missing key. Listing is paged: callers pass the cursor
/// from the previous page back in until `truncated` is false.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, pool: &str, key: &str) -> Result<Vec<u8>>;
    async fn put(&self, pool: &str, key: &str, data: &[u8], exclusive: bool) -> Result<()>;
    async fn delete(&self, pool: &str, key: &str) -> Result<()>;
    async fn list_by_prefix(
        &self,
        pool: &str,
        prefix: &str,
        max_keys: usize,
        cursor: Option<&str>,
    ) -> Result<Listing>;
}

/// Clock for current time (enables testing with deterministic timestamps)
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
    fn now_millis(&self) -> u64;
}

/// Environment/configuration access
pub trait Environment {
    fn get_var(&self, name: &str) -> Result<String>;
}

/// JWT signature verification primitive.
///
/// Given the raw token, its decoded header and the DER bytes of the
/// certificate resolved from the provider's registered material, confirms
/// or refutes the token signature. Key extraction and X.509 parsing live
/// behind this boundary.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, token: &str, header: &WebTokenHeader, cert_der: &[u8]) -> Result<bool>;
}

/// Mints temporary credentials for a validated identity
#[async_trait]
pub trait CredentialsIssuer: Send + Sync {
    async fn issue(
        &self,
        request: &AssumeRoleWithWebIdentityRequest,
        identity: &Identity,
    ) -> Result<Credentials>;
}
