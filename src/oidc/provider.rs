//! OIDC provider record: validation, wire encoding, JSON projections

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::error::{Error, Result};

pub(crate) const MAX_OIDC_NUM_CLIENT_IDS: usize = 100;
pub(crate) const MAX_OIDC_CLIENT_ID_LEN: usize = 255;
pub(crate) const MAX_OIDC_NUM_THUMBPRINTS: usize = 5;
pub(crate) const MAX_OIDC_THUMBPRINT_LEN: usize = 40;
pub(crate) const MAX_OIDC_URL_LEN: usize = 255;

/// Record struct version written with every encode
const ENCODE_STRUCT_VERSION: u8 = 3;
/// Minimum version a reader must understand to decode what we write
const ENCODE_COMPAT_VERSION: u8 = 1;
/// Newest version this decoder understands
const DECODE_VERSION: u8 = 2;

/// A registered OIDC identity provider, scoped to a tenant
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OidcProvider {
    pub id: String,
    pub provider_url: String,
    pub arn: String,
    pub creation_date: String,
    pub tenant: String,
    pub client_ids: Vec<String>,
    pub thumbprints: Vec<String>,
}

/// Versioned persisted form: the version pair first, then the field list
/// in fixed order.
#[derive(Serialize, Deserialize)]
struct PersistedProvider {
    v: u8,
    compat: u8,
    id: String,
    provider_url: String,
    arn: String,
    creation_date: String,
    tenant: String,
    client_ids: Vec<String>,
    thumbprints: Vec<String>,
}

impl OidcProvider {
    /// Check the record against the registry's length and count bounds.
    /// A violation is reported, not raised.
    pub fn validate_input(&self) -> bool {
        if self.provider_url.len() > MAX_OIDC_URL_LEN {
            warn!(url = %self.provider_url, "invalid length of provider url");
            return false;
        }
        if self.client_ids.len() > MAX_OIDC_NUM_CLIENT_IDS {
            warn!(count = self.client_ids.len(), "invalid number of client ids");
            return false;
        }
        for client_id in &self.client_ids {
            if client_id.len() > MAX_OIDC_CLIENT_ID_LEN {
                return false;
            }
        }
        if self.thumbprints.len() > MAX_OIDC_NUM_THUMBPRINTS {
            warn!(count = self.thumbprints.len(), "invalid number of thumbprints");
            return false;
        }
        for thumbprint in &self.thumbprints {
            if thumbprint.len() > MAX_OIDC_THUMBPRINT_LEN {
                return false;
            }
        }
        true
    }

    /// Encode into the versioned wire format
    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        let persisted = PersistedProvider {
            v: ENCODE_STRUCT_VERSION,
            compat: ENCODE_COMPAT_VERSION,
            id: self.id.clone(),
            provider_url: self.provider_url.clone(),
            arn: self.arn.clone(),
            creation_date: self.creation_date.clone(),
            tenant: self.tenant.clone(),
            client_ids: self.client_ids.clone(),
            thumbprints: self.thumbprints.clone(),
        };
        serde_json::to_vec(&persisted)
            .map_err(|e| Error::internal(format!("failed to encode provider record: {}", e)))
    }

    /// Decode from the versioned wire format.
    ///
    /// Corrupt or truncated bytes are an I/O error. A record whose minimum
    /// compatible version is newer than this decoder is unreadable and
    /// reported the same way.
    pub(crate) fn decode(bytes: &[u8]) -> Result<Self> {
        let persisted: PersistedProvider = serde_json::from_slice(bytes)
            .map_err(|e| Error::io(format!("failed to decode provider record: {}", e)))?;

        if persisted.compat > DECODE_VERSION {
            return Err(Error::io(format!(
                "provider record requires version {} but decoder understands {}",
                persisted.compat, DECODE_VERSION
            )));
        }

        Ok(Self {
            id: persisted.id,
            provider_url: persisted.provider_url,
            arn: persisted.arn,
            creation_date: persisted.creation_date,
            tenant: persisted.tenant,
            client_ids: persisted.client_ids,
            thumbprints: persisted.thumbprints,
        })
    }

    /// ARN-only projection returned by create/delete style operations
    pub fn dump(&self) -> serde_json::Value {
        json!({ "OpenIDConnectProviderArn": self.arn })
    }

    /// Full projection returned by get style operations
    pub fn dump_all(&self) -> serde_json::Value {
        json!({
            "ClientIDList": self.client_ids,
            "CreateDate": self.creation_date,
            "ThumbprintList": self.thumbprints,
            "Url": self.provider_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OidcProvider {
        OidcProvider {
            provider_url: "accounts.example.com".to_string(),
            tenant: "acme".to_string(),
            client_ids: vec!["abc123".to_string()],
            thumbprints: vec!["aa11bb22cc33dd44ee55ff66aa11bb22cc33dd44".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_accepts_bounds() {
        let mut p = provider();
        p.provider_url = "u".repeat(MAX_OIDC_URL_LEN);
        p.client_ids = vec!["c".repeat(MAX_OIDC_CLIENT_ID_LEN); MAX_OIDC_NUM_CLIENT_IDS];
        p.thumbprints = vec!["f".repeat(MAX_OIDC_THUMBPRINT_LEN); MAX_OIDC_NUM_THUMBPRINTS];
        assert!(p.validate_input());
    }

    #[test]
    fn test_validate_rejects_oversized_url() {
        let mut p = provider();
        p.provider_url = "u".repeat(MAX_OIDC_URL_LEN + 1);
        assert!(!p.validate_input());
    }

    #[test]
    fn test_validate_rejects_too_many_client_ids() {
        let mut p = provider();
        p.client_ids = vec!["c".to_string(); MAX_OIDC_NUM_CLIENT_IDS + 1];
        assert!(!p.validate_input());
    }

    #[test]
    fn test_validate_rejects_oversized_client_id() {
        let mut p = provider();
        p.client_ids = vec!["c".repeat(MAX_OIDC_CLIENT_ID_LEN + 1)];
        assert!(!p.validate_input());
    }

    #[test]
    fn test_validate_rejects_too_many_thumbprints() {
        let mut p = provider();
        p.thumbprints = vec!["f".repeat(40); MAX_OIDC_NUM_THUMBPRINTS + 1];
        assert!(!p.validate_input());
    }

    #[test]
    fn test_validate_rejects_oversized_thumbprint() {
        let mut p = provider();
        p.thumbprints = vec!["f".repeat(MAX_OIDC_THUMBPRINT_LEN + 1)];
        assert!(!p.validate_input());
    }

    #[test]
    fn test_encode_decode_preserves_fields() {
        let mut p = provider();
        p.arn = "arn:aws:iam::acme:oidc-provider/accounts.example.com".to_string();
        p.creation_date = "2026-01-02T03:04:05.678Z".to_string();
        let decoded = OidcProvider::decode(&p.encode().unwrap()).unwrap();
        assert_eq!(decoded, p);
    }

    #[test]
    fn test_decode_rejects_garbage_as_io_error() {
        assert!(matches!(
            OidcProvider::decode(b"\x00\x01not json"),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_future_compat_version() {
        let mut bytes = provider().encode().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        let bumped = text.replace("\"compat\":1", "\"compat\":3");
        assert_ne!(text, bumped);
        bytes = bumped.into_bytes();
        assert!(matches!(OidcProvider::decode(&bytes), Err(Error::Io { .. })));
    }

    #[test]
    fn test_decode_accepts_older_compat_versions() {
        let text = String::from_utf8(provider().encode().unwrap()).unwrap();
        let lowered = text.replace("\"v\":3", "\"v\":2");
        assert!(OidcProvider::decode(lowered.as_bytes()).is_ok());
    }

    #[test]
    fn test_dump_projections() {
        let mut p = provider();
        p.arn = "arn:aws:iam::acme:oidc-provider/accounts.example.com".to_string();
        p.creation_date = "2026-01-02T03:04:05.678Z".to_string();

        assert_eq!(
            p.dump(),
            json!({"OpenIDConnectProviderArn": "arn:aws:iam::acme:oidc-provider/accounts.example.com"})
        );
        assert_eq!(
            p.dump_all(),
            json!({
                "ClientIDList": ["abc123"],
                "CreateDate": "2026-01-02T03:04:05.678Z",
                "ThumbprintList": ["aa11bb22cc33dd44ee55ff66aa11bb22cc33dd44"],
                "Url": "accounts.example.com",
            })
        );
    }
}
