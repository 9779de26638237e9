//! AssumeRoleWithWebIdentity operation

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::arn;
use crate::auth::Identity;
use crate::error::{Error, Result};
use crate::params::RequestParams;
use crate::platform::CredentialsIssuer;

const MIN_DURATION_SECS: u64 = 900;
const MAX_DURATION_SECS: u64 = 43200;
const DEFAULT_DURATION_SECS: u64 = 3600;

/// Temporary credentials minted for an assumed role
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Credentials {
    #[serde(rename = "AccessKeyId")]
    pub access_key_id: String,
    #[serde(rename = "SecretAccessKey")]
    pub secret_access_key: String,
    #[serde(rename = "SessionToken")]
    pub session_token: String,
    #[serde(rename = "Expiration")]
    pub expiration: String,
}

/// Parameters of an AssumeRoleWithWebIdentity request.
///
/// The web-identity token itself is consumed by the auth layer before the
/// operation runs, so it is not read here.
#[derive(Debug, Clone)]
pub struct AssumeRoleWithWebIdentityRequest {
    pub role_arn: String,
    pub role_session_name: String,
    pub duration_seconds: u64,
    pub provider_id: Option<String>,
    pub policy: Option<String>,
}

/// Operation response: the credentials plus the authenticated claims
#[derive(Debug, Serialize)]
pub struct AssumeRoleWithWebIdentityResponse {
    #[serde(rename = "Credentials")]
    pub credentials: Credentials,
    #[serde(rename = "SubjectFromWebIdentityToken")]
    pub subject: String,
    #[serde(rename = "Audience")]
    pub audience: String,
    #[serde(rename = "Provider")]
    pub issuer: String,
}

impl AssumeRoleWithWebIdentityRequest {
    /// Read and validate the operation parameters from the request
    pub fn get_params(request: &RequestParams) -> Result<Self> {
        let role_arn = request
            .get_non_empty("RoleArn")
            .ok_or_else(|| Error::invalid_input("RoleArn is required"))?;
        arn::parse(role_arn)?;

        let role_session_name = request
            .get_non_empty("RoleSessionName")
            .ok_or_else(|| Error::invalid_input("RoleSessionName is required"))?;
        validate_role_session_name(role_session_name)?;

        let duration_seconds = match request.get_non_empty("DurationSeconds") {
            Some(raw) => {
                let duration: u64 = raw.parse().map_err(|_| {
                    Error::invalid_input(format!("DurationSeconds is not a number: {}", raw))
                })?;
                if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&duration) {
                    return Err(Error::invalid_input(format!(
                        "DurationSeconds must be between {} and {}",
                        MIN_DURATION_SECS, MAX_DURATION_SECS
                    )));
                }
                duration
            }
            None => DEFAULT_DURATION_SECS,
        };

        Ok(Self {
            role_arn: role_arn.to_string(),
            role_session_name: role_session_name.to_string(),
            duration_seconds,
            provider_id: request.get_non_empty("ProviderId").map(str::to_string),
            policy: request.get_non_empty("Policy").map(str::to_string),
        })
    }

    /// Mint credentials for the granted identity and assemble the response
    pub async fn execute(
        &self,
        identity: &Identity,
        issuer: &dyn CredentialsIssuer,
    ) -> Result<AssumeRoleWithWebIdentityResponse> {
        debug!(role_arn = %self.role_arn, subject = %identity.subject, "assuming role");
        let credentials = issuer.issue(self, identity).await?;

        Ok(AssumeRoleWithWebIdentityResponse {
            credentials,
            subject: identity.subject.clone(),
            audience: identity.audience.clone(),
            issuer: identity.issuer.clone(),
        })
    }
}

fn validate_role_session_name(name: &str) -> Result<()> {
    // Same character set and length the STS API documents.
    let pattern = Regex::new(r"^[A-Za-z0-9_=,.@-]{2,64}$")
        .map_err(|e| Error::internal(format!("invalid session name pattern: {}", e)))?;
    if !pattern.is_match(name) {
        return Err(Error::invalid_input(format!(
            "invalid RoleSessionName: {}",
            name
        )));
    }
    Ok(())
}
