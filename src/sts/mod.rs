//! STS operation surface
//!
//! The assume-role-with-web-identity operation consumes an identity
//! already granted by the auth layer and delegates credential minting to
//! an external issuer.

mod assume_role;

pub use assume_role::{
    AssumeRoleWithWebIdentityRequest, AssumeRoleWithWebIdentityResponse, Credentials,
};
