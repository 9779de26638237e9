//! Provider registry operations against the storage backend

use std::sync::Arc;

use chrono::DateTime;
use tracing::{debug, warn};

use crate::arn;
use crate::config::{LIST_PAGE_SIZE, OIDC_URL_OID_PREFIX};
use crate::error::{Error, Result};
use crate::oidc::OidcProvider;
use crate::platform::{Clock, Store};

/// CRUD and enumeration over OIDC provider records.
///
/// The registry is the sole owner of the records; all consistency comes
/// from the store's own primitives (exclusive create is a single
/// conditional write), so no in-process locking is needed.
pub struct ProviderRegistry {
    store: Arc<dyn Store>,
    pool: String,
}

impl ProviderRegistry {
    pub fn new(store: Arc<dyn Store>, pool: impl Into<String>) -> Self {
        Self {
            store,
            pool: pool.into(),
        }
    }

    fn oid(tenant: &str, url: &str) -> String {
        format!("{}{}{}", tenant, OIDC_URL_OID_PREFIX, url)
    }

    /// Create a provider record.
    ///
    /// Fills in the ARN and creation date and persists the record. With
    /// `exclusive` set, an existing record under the same `(tenant, url)`
    /// fails `AlreadyExists`; without it, the record is overwritten. The
    /// store's conditional write is the authoritative uniqueness guard;
    /// the pre-read only gives a definitive early answer.
    pub async fn create(
        &self,
        clock: &dyn Clock,
        provider: OidcProvider,
        exclusive: bool,
    ) -> Result<OidcProvider> {
        if !provider.validate_input() {
            return Err(Error::invalid_input("provider record failed validation"));
        }

        let mut provider = provider;
        let idp_url = arn::url_remove_prefix(&provider.provider_url).to_string();

        // Check to see the url is not already in use.
        match self.read_url(&provider.tenant, &idp_url).await {
            Ok(_) if exclusive => {
                warn!(url = %provider.provider_url, "provider url already in use");
                return Err(Error::already_exists(format!(
                    "url {} already in use",
                    provider.provider_url
                )));
            }
            Ok(_) => {}
            Err(Error::NotFound { .. }) => {}
            Err(e) => {
                warn!(url = %provider.provider_url, error = %e, "failed reading provider url");
                return Err(e);
            }
        }

        provider.arn = arn::build_oidc_provider_arn(&provider.tenant, &idp_url);
        provider.creation_date = iso8601_millis(clock.now_millis());

        let bytes = provider.encode()?;
        let oid = Self::oid(&provider.tenant, &idp_url);
        self.store
            .put(&self.pool, &oid, &bytes, exclusive)
            .await
            .map_err(|e| {
                warn!(pool = %self.pool, url = %provider.provider_url, error = %e,
                    "failed storing provider record");
                e
            })?;

        Ok(provider)
    }

    /// Load the record named by `arn`, on behalf of `tenant`.
    ///
    /// The tenant encoded in the ARN must match the caller's tenant.
    pub async fn get(&self, provider_arn: &str, tenant: &str) -> Result<OidcProvider> {
        let (arn_tenant, url) = Self::tenant_url_from_arn(provider_arn)?;
        if arn_tenant != tenant {
            warn!(arn_tenant = %arn_tenant, tenant = %tenant, "tenant in arn doesn't match that of user");
            return Err(Error::tenant_mismatch(format!(
                "arn tenant {} does not match caller tenant {}",
                arn_tenant, tenant
            )));
        }
        self.read_url(&arn_tenant, &url).await
    }

    /// Delete the record named by `arn`, on behalf of `tenant`.
    ///
    /// Same ARN-parse and tenant-match contract as `get`; storage errors
    /// propagate unchanged.
    pub async fn delete(&self, provider_arn: &str, tenant: &str) -> Result<()> {
        let (arn_tenant, url) = Self::tenant_url_from_arn(provider_arn)?;
        if arn_tenant != tenant {
            warn!(arn_tenant = %arn_tenant, tenant = %tenant, "tenant in arn doesn't match that of user");
            return Err(Error::tenant_mismatch(format!(
                "arn tenant {} does not match caller tenant {}",
                arn_tenant, tenant
            )));
        }

        let oid = Self::oid(&arn_tenant, &url);
        self.store.delete(&self.pool, &oid).await.map_err(|e| {
            warn!(pool = %self.pool, url = %url, error = %e, "failed deleting provider record");
            e
        })
    }

    /// Enumerate all providers registered for a tenant.
    ///
    /// Pages through the store with a continuation cursor until the
    /// backend reports no further truncation. Not an atomic snapshot:
    /// records created or deleted mid-enumeration may or may not appear.
    pub async fn get_providers(&self, tenant: &str) -> Result<Vec<OidcProvider>> {
        let prefix = format!("{}{}", tenant, OIDC_URL_OID_PREFIX);
        let mut providers = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .store
                .list_by_prefix(&self.pool, &prefix, LIST_PAGE_SIZE, cursor.as_deref())
                .await
                .map_err(|e| {
                    warn!(pool = %self.pool, prefix = %prefix, error = %e,
                        "listing provider records failed");
                    e
                })?;

            for key in &page.keys {
                let bytes = self.store.get(&self.pool, key).await?;
                providers.push(OidcProvider::decode(&bytes)?);
            }

            if !page.truncated {
                break;
            }
            cursor = page.next_cursor;
        }

        debug!(tenant = %tenant, count = providers.len(), "enumerated providers");
        Ok(providers)
    }

    fn tenant_url_from_arn(provider_arn: &str) -> Result<(String, String)> {
        let (tenant, resource) = arn::parse(provider_arn)?;
        Ok((tenant, arn::strip_provider_segment(&resource)))
    }

    async fn read_url(&self, tenant: &str, url: &str) -> Result<OidcProvider> {
        let oid = Self::oid(tenant, url);
        let bytes = self.store.get(&self.pool, &oid).await?;
        OidcProvider::decode(&bytes)
    }
}

/// Format a millisecond timestamp as UTC ISO-8601 with millisecond precision
fn iso8601_millis(millis: u64) -> String {
    DateTime::from_timestamp_millis(millis as i64)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        .unwrap_or_default()
}
