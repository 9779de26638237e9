//! ARN building and parsing
//!
//! Providers and roles are named by Amazon-Resource-Name-style strings of
//! the form `arn:aws:iam::<tenant>:<resource>`. The region field is always
//! empty for IAM resources, so the literal prefix is fixed.

use crate::config::{OIDC_ARN_PREFIX, OIDC_PROVIDER_SEGMENT};
use crate::error::{Error, Result};

/// Build the ARN naming an OIDC provider within a tenant
pub fn build_oidc_provider_arn(tenant: &str, url: &str) -> String {
    format!("{}{}:{}{}", OIDC_ARN_PREFIX, tenant, OIDC_PROVIDER_SEGMENT, url)
}

/// Parse an IAM ARN into its account (tenant) and resource path.
///
/// The resource path may itself contain `:` and `/`; only the first colon
/// after the account field delimits it.
pub fn parse(arn: &str) -> Result<(String, String)> {
    let rest = arn
        .strip_prefix(OIDC_ARN_PREFIX)
        .ok_or_else(|| Error::parse_failure(format!("unexpected arn prefix: {}", arn)))?;

    let (account, resource) = rest
        .split_once(':')
        .ok_or_else(|| Error::parse_failure(format!("arn has no resource field: {}", arn)))?;

    Ok((account.to_string(), resource.to_string()))
}

/// Remove the first `oidc-provider/` segment from a resource path,
/// recovering the bare provider URL. No-op when the segment is absent.
pub fn strip_provider_segment(path: &str) -> String {
    match path.find(OIDC_PROVIDER_SEGMENT) {
        Some(pos) => {
            let mut url = path.to_string();
            url.replace_range(pos..pos + OIDC_PROVIDER_SEGMENT.len(), "");
            url
        }
        None => path.to_string(),
    }
}

/// Strip a leading http/https scheme from a provider URL
pub fn url_remove_prefix(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}
