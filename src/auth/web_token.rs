//! Web-identity token decoding and validation
//!
//! Decodes an inbound JWT without trusting its signature, resolves the
//! issuing provider from the registry, and validates audience, certificate
//! thumbprint, signature and time-bound claims before emitting an identity.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use jsonwebtoken::{decode_header, Algorithm};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::arn;
use crate::auth::{AuthOutcome, Engine, TokenExtractor, WebIdentityApplierFactory};
use crate::error::{Error, Result};
use crate::oidc::ProviderRegistry;
use crate::params::RequestParams;
use crate::platform::{Clock, SignatureVerifier};

/// Leeway granted to the not-before claim, in seconds
const NBF_LEEWAY_SECS: u64 = 60;

/// Decoded JWT header fields the engine acts on
#[derive(Debug, Clone)]
pub struct WebTokenHeader {
    pub algorithm: Algorithm,
    pub key_id: Option<String>,
    /// x5c certificate chain, standard-base64 DER entries
    pub cert_chain: Vec<String>,
}

/// Decoded, not yet trust-verified token claims
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebTokenClaims {
    pub issuer: String,
    pub subject: String,
    pub audience: String,
    pub claims: HashMap<String, String>,
    pub expiration: Option<u64>,
    pub not_before: Option<u64>,
}

/// A parsed token: header plus claims, signature unchecked
#[derive(Debug, Clone)]
pub struct DecodedToken {
    pub header: WebTokenHeader,
    pub claims: WebTokenClaims,
}

#[derive(Deserialize)]
struct RawClaims {
    iss: String,
    sub: String,
    #[serde(default, deserialize_with = "deserialize_audience")]
    aud: String,
    #[serde(default)]
    exp: Option<u64>,
    #[serde(default)]
    nbf: Option<u64>,
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

/// Deserialize audience as either a string or an array of strings.
/// A multi-valued audience keeps its first entry.
fn deserialize_audience<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct AudienceVisitor;

    impl<'de> Visitor<'de> for AudienceVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("string or array of strings")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<String, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut first = None;
            while let Some(value) = seq.next_element::<String>()? {
                first.get_or_insert(value);
            }
            Ok(first.unwrap_or_default())
        }
    }

    deserializer.deserialize_any(AudienceVisitor)
}

/// Parse an untrusted JWT into header and claims without verifying the
/// signature. Malformed input fails `DecodeFailure`.
pub fn decode_token(token: &str) -> Result<DecodedToken> {
    let header = decode_header(token)
        .map_err(|e| Error::decode_failure(format!("invalid JWT header: {}", e)))?;

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(Error::decode_failure("invalid JWT format"));
    }

    let payload = base64_url_decode(parts[1])?;
    let raw: RawClaims = serde_json::from_slice(&payload)
        .map_err(|e| Error::decode_failure(format!("invalid JWT claims: {}", e)))?;

    let mut claims = HashMap::new();
    claims.insert("iss".to_string(), raw.iss.clone());
    claims.insert("sub".to_string(), raw.sub.clone());
    claims.insert("aud".to_string(), raw.aud.clone());
    for (name, value) in raw.extra {
        let value = match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        claims.insert(name, value);
    }

    Ok(DecodedToken {
        header: WebTokenHeader {
            algorithm: header.alg,
            key_id: header.kid,
            cert_chain: header.x5c.unwrap_or_default(),
        },
        claims: WebTokenClaims {
            issuer: raw.iss,
            subject: raw.sub,
            audience: raw.aud,
            claims,
            expiration: raw.exp,
            not_before: raw.nbf,
        },
    })
}

fn base64_url_decode(input: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(input)
        .or_else(|_| URL_SAFE.decode(input))
        .map_err(|e| Error::decode_failure(format!("invalid base64: {}", e)))
}

/// Hex SHA-1 thumbprint of a DER certificate
pub(crate) fn cert_thumbprint(der: &[u8]) -> String {
    format!("{:x}", Sha1::digest(der))
}

/// Authenticates requests carrying a web-identity token.
///
/// The sequence is fixed: extract, decode, resolve tenant and provider,
/// check audience against the registered client ids, check the signing
/// certificate against the registered thumbprints, verify the signature
/// and time-bound claims. Each step short-circuits to a denial; a denial
/// is terminal for the attempt.
pub struct WebTokenEngine {
    registry: ProviderRegistry,
    verifier: Arc<dyn SignatureVerifier>,
    clock: Arc<dyn Clock>,
    extractor: Arc<dyn TokenExtractor>,
    applier: Arc<dyn WebIdentityApplierFactory>,
}

impl WebTokenEngine {
    pub fn new(
        registry: ProviderRegistry,
        verifier: Arc<dyn SignatureVerifier>,
        clock: Arc<dyn Clock>,
        extractor: Arc<dyn TokenExtractor>,
        applier: Arc<dyn WebIdentityApplierFactory>,
    ) -> Self {
        Self {
            registry,
            verifier,
            clock,
            extractor,
            applier,
        }
    }

    /// Tenant is the account field of the caller-supplied role ARN.
    /// An absent or unparsable role ARN resolves to the empty tenant.
    fn get_role_tenant(request: &RequestParams) -> String {
        request
            .get("RoleArn")
            .and_then(|role_arn| arn::parse(role_arn).ok())
            .map(|(tenant, _)| tenant)
            .unwrap_or_default()
    }

    fn is_client_id_valid(client_ids: &[String], audience: &str) -> bool {
        client_ids.iter().any(|id| id == audience)
    }

    fn validate_signature(&self, token: &str, decoded: &DecodedToken, thumbprints: &[String]) -> Result<()> {
        if matches!(
            decoded.header.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(Error::signature_invalid(
                "hmac-signed tokens have no registered verification material",
            ));
        }

        let cert_b64 = decoded
            .header
            .cert_chain
            .first()
            .ok_or_else(|| Error::signature_invalid("token carries no certificate chain"))?;
        let cert_der = STANDARD
            .decode(cert_b64)
            .map_err(|e| Error::signature_invalid(format!("invalid x5c certificate: {}", e)))?;

        let thumbprint = cert_thumbprint(&cert_der);
        if !thumbprints
            .iter()
            .any(|registered| registered.eq_ignore_ascii_case(&thumbprint))
        {
            warn!(thumbprint = %thumbprint, "certificate thumbprint not registered");
            return Err(Error::signature_invalid(
                "certificate thumbprint not registered for provider",
            ));
        }

        match self.verifier.verify(token, &decoded.header, &cert_der) {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::signature_invalid("signature verification failed")),
            Err(e) => Err(Error::signature_invalid(format!(
                "signature verification failed: {}",
                e
            ))),
        }
    }

    fn validate_time_claims(&self, claims: &WebTokenClaims) -> Result<()> {
        let now_secs = self.clock.now_secs();

        if let Some(exp) = claims.expiration {
            if exp <= now_secs {
                return Err(Error::token_expired("token has expired"));
            }
        }

        if let Some(nbf) = claims.not_before {
            if nbf > now_secs + NBF_LEEWAY_SECS {
                return Err(Error::token_expired("token is not yet valid (nbf claim)"));
            }
        }

        Ok(())
    }

    async fn try_authenticate(&self, token: &str, request: &RequestParams) -> AuthOutcome {
        let decoded = match decode_token(token) {
            Ok(decoded) => decoded,
            Err(e) => return AuthOutcome::Denied(e),
        };

        let tenant = Self::get_role_tenant(request);
        let idp_url = arn::url_remove_prefix(&decoded.claims.issuer);
        let provider_arn = arn::build_oidc_provider_arn(&tenant, idp_url);

        let provider = match self.registry.get(&provider_arn, &tenant).await {
            Ok(provider) => provider,
            Err(Error::NotFound { .. }) => {
                debug!(issuer = %decoded.claims.issuer, tenant = %tenant, "issuer not registered");
                return AuthOutcome::Denied(Error::provider_not_found(format!(
                    "no provider registered for issuer {}",
                    decoded.claims.issuer
                )));
            }
            Err(e) => return AuthOutcome::Denied(e),
        };

        // An empty client id list accepts any audience.
        if !provider.client_ids.is_empty()
            && !Self::is_client_id_valid(&provider.client_ids, &decoded.claims.audience)
        {
            return AuthOutcome::Denied(Error::audience_invalid(format!(
                "audience {} not registered for provider",
                decoded.claims.audience
            )));
        }

        if let Err(e) = self.validate_signature(token, &decoded, &provider.thumbprints) {
            return AuthOutcome::Denied(e);
        }

        if let Err(e) = self.validate_time_claims(&decoded.claims) {
            return AuthOutcome::Denied(e);
        }

        let role_session = request.get("RoleSessionName").unwrap_or_default();
        AuthOutcome::Granted(
            self.applier
                .create_identity(&decoded.claims, role_session, &tenant),
        )
    }
}

#[async_trait]
impl Engine for WebTokenEngine {
    fn name(&self) -> &'static str {
        "websts::auth::WebTokenEngine"
    }

    async fn authenticate(&self, request: &RequestParams) -> AuthOutcome {
        let Some(token) = self.extractor.get_token(request) else {
            return AuthOutcome::NotApplicable;
        };
        self.try_authenticate(&token, request).await
    }
}
