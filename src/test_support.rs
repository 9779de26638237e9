//! Mock implementations of collaborator traits for testing

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::auth::web_token::WebTokenHeader;
use crate::auth::Identity;
use crate::error::{Error, Result};
use crate::platform::{
    Clock, CredentialsIssuer, Environment, Listing, SignatureVerifier, Store,
};
use crate::sts::{AssumeRoleWithWebIdentityRequest, Credentials};

type ErrorFactory = Box<dyn Fn() -> Error + Send>;

/// Mock store backed by an ordered in-memory map.
///
/// Keys are composited as `pool/key` so listing stays pool-scoped. A page
/// cap can be set to force multi-page enumeration regardless of the page
/// size the caller asks for.
pub struct MockStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    page_cap: Mutex<Option<usize>>,
    get_error: Mutex<Option<ErrorFactory>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_cap: Mutex::new(None),
            get_error: Mutex::new(None),
        }
    }

    fn composite(pool: &str, key: &str) -> String {
        format!("{}/{}", pool, key)
    }

    /// Cap the number of keys returned per listing page
    pub fn set_page_cap(&self, cap: usize) {
        *self.page_cap.lock().unwrap() = Some(cap);
    }

    /// Make every subsequent `get` fail with the produced error
    pub fn fail_gets_with(&self, factory: impl Fn() -> Error + Send + 'static) {
        *self.get_error.lock().unwrap() = Some(Box::new(factory));
    }

    pub fn contains(&self, pool: &str, key: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&Self::composite(pool, key))
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MockStore {
    async fn get(&self, pool: &str, key: &str) -> Result<Vec<u8>> {
        if let Some(factory) = self.get_error.lock().unwrap().as_ref() {
            return Err(factory());
        }
        self.objects
            .lock()
            .unwrap()
            .get(&Self::composite(pool, key))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no object at {}/{}", pool, key)))
    }

    async fn put(&self, pool: &str, key: &str, data: &[u8], exclusive: bool) -> Result<()> {
        let mut objects = self.objects.lock().unwrap();
        let composite = Self::composite(pool, key);
        if exclusive && objects.contains_key(&composite) {
            return Err(Error::already_exists(format!(
                "object at {}/{} already exists",
                pool, key
            )));
        }
        objects.insert(composite, data.to_vec());
        Ok(())
    }

    async fn delete(&self, pool: &str, key: &str) -> Result<()> {
        self.objects
            .lock()
            .unwrap()
            .remove(&Self::composite(pool, key))
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("no object at {}/{}", pool, key)))
    }

    async fn list_by_prefix(
        &self,
        pool: &str,
        prefix: &str,
        max_keys: usize,
        cursor: Option<&str>,
    ) -> Result<Listing> {
        let cap = self.page_cap.lock().unwrap().unwrap_or(usize::MAX);
        let limit = max_keys.min(cap).max(1);
        let full_prefix = Self::composite(pool, prefix);
        let resume_after = cursor.map(|c| Self::composite(pool, c));

        let objects = self.objects.lock().unwrap();
        let mut keys = Vec::new();
        let mut truncated = false;
        for composite in objects.keys().filter(|k| k.starts_with(&full_prefix)) {
            if let Some(ref after) = resume_after {
                if composite.as_str() <= after.as_str() {
                    continue;
                }
            }
            if keys.len() == limit {
                truncated = true;
                break;
            }
            keys.push(composite[pool.len() + 1..].to_string());
        }

        let next_cursor = if truncated { keys.last().cloned() } else { None };
        Ok(Listing {
            keys,
            next_cursor,
            truncated,
        })
    }
}

/// Mock clock with a fixed timestamp, in seconds
pub struct MockClock(pub u64);

impl Clock for MockClock {
    fn now_secs(&self) -> u64 {
        self.0
    }

    fn now_millis(&self) -> u64 {
        self.0 * 1000
    }
}

/// Mock environment backed by an in-memory HashMap
pub struct MockEnv {
    vars: HashMap<String, String>,
}

impl MockEnv {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}

impl Environment for MockEnv {
    fn get_var(&self, name: &str) -> Result<String> {
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| Error::internal(format!("variable '{}' not found", name)))
    }
}

/// Mock signature verifier with a fixed verdict
pub struct MockVerifier {
    verdict: Result<bool>,
}

impl MockVerifier {
    /// Accept every signature
    pub fn ok() -> Self {
        Self { verdict: Ok(true) }
    }

    /// Refute every signature
    pub fn refusing() -> Self {
        Self { verdict: Ok(false) }
    }

    /// Fail verification itself
    pub fn erroring() -> Self {
        Self {
            verdict: Err(Error::internal("verifier unavailable")),
        }
    }
}

impl SignatureVerifier for MockVerifier {
    fn verify(&self, _token: &str, _header: &WebTokenHeader, _cert_der: &[u8]) -> Result<bool> {
        match &self.verdict {
            Ok(b) => Ok(*b),
            Err(e) => Err(Error::internal(e.to_string())),
        }
    }
}

/// Mock credential minter producing deterministic credentials
pub struct MockIssuer;

#[async_trait]
impl CredentialsIssuer for MockIssuer {
    async fn issue(
        &self,
        request: &AssumeRoleWithWebIdentityRequest,
        identity: &Identity,
    ) -> Result<Credentials> {
        Ok(Credentials {
            access_key_id: format!("AKID{}", identity.subject),
            secret_access_key: "secret".to_string(),
            session_token: format!("token-for-{}", request.role_arn),
            expiration: "2026-01-01T00:00:00Z".to_string(),
        })
    }
}
