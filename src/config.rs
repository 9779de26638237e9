//! Configuration and process-wide constants

use crate::error::{Error, Result};
use crate::platform::Environment;

/// Application configuration loaded from environment
pub struct Config {
    /// Logical storage namespace holding OIDC provider records
    pub oidc_pool: String,
}

impl Config {
    /// Load configuration from platform environment
    pub fn from_env(env: &dyn Environment) -> Result<Self> {
        Ok(Self {
            oidc_pool: env
                .get_var("OIDC_POOL")
                .map_err(|_| Error::internal("OIDC_POOL not configured"))?,
        })
    }
}

/// Storage key prefix for provider records, appended to the tenant
pub const OIDC_URL_OID_PREFIX: &str = "oidc_url.";

/// ARN prefix shared by provider and role ARNs
pub const OIDC_ARN_PREFIX: &str = "arn:aws:iam::";

/// Resource-path segment naming a provider inside an ARN
pub const OIDC_PROVIDER_SEGMENT: &str = "oidc-provider/";

/// Page size for bounded registry enumeration
pub const LIST_PAGE_SIZE: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockEnv;
    use std::collections::HashMap;

    #[test]
    fn test_from_env_reads_pool() {
        let env = MockEnv::new(HashMap::from([(
            "OIDC_POOL".to_string(),
            "zone.oidc".to_string(),
        )]));
        let config = Config::from_env(&env).unwrap();
        assert_eq!(config.oidc_pool, "zone.oidc");
    }

    #[test]
    fn test_from_env_missing_pool() {
        let env = MockEnv::new(HashMap::new());
        assert!(matches!(
            Config::from_env(&env),
            Err(Error::Internal { .. })
        ));
    }
}
