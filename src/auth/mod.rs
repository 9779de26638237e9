//! Authentication engines and strategy composition
//!
//! An engine attempts to authenticate a request and reports one of three
//! outcomes: a grant with a resolved identity, a denial with the specific
//! reason, or "not applicable" so other engines in the strategy may run.

pub mod web_token;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::oidc::ProviderRegistry;
use crate::params::RequestParams;
use crate::platform::{Clock, SignatureVerifier};
use web_token::{WebTokenClaims, WebTokenEngine};

/// The trusted output of a successful authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub audience: String,
    pub issuer: String,
    pub tenant: String,
    pub role_session_name: String,
}

/// Outcome of one engine's authentication attempt
#[derive(Debug)]
pub enum AuthOutcome {
    /// The engine was applicable and the request is authentic
    Granted(Identity),
    /// The engine does not apply to this request; others may still run
    NotApplicable,
    /// The engine was applicable and rejects the request
    Denied(Error),
}

/// A single authentication engine
#[async_trait]
pub trait Engine: Send + Sync {
    fn name(&self) -> &'static str;
    async fn authenticate(&self, request: &RequestParams) -> AuthOutcome;
}

/// How a strategy treats an engine's decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// A grant or denial from this engine is final
    Sufficient,
    /// A denial from this engine lets later engines run
    Fallback,
}

/// Extracts the web-identity token from a request
pub trait TokenExtractor: Send + Sync {
    fn get_token(&self, request: &RequestParams) -> Option<String>;
}

/// Binds validated claims to a role session name and tenant
pub trait WebIdentityApplierFactory: Send + Sync {
    fn create_identity(
        &self,
        claims: &WebTokenClaims,
        role_session: &str,
        tenant: &str,
    ) -> Identity;
}

/// Ordered chain of authentication engines
#[derive(Default)]
pub struct Strategy {
    engines: Vec<(Control, Arc<dyn Engine>)>,
}

impl Strategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_engine(&mut self, control: Control, engine: Arc<dyn Engine>) {
        self.engines.push((control, engine));
    }

    /// Run engines in order until one is decisive.
    ///
    /// A grant short-circuits with the identity. A denial from a
    /// sufficient engine short-circuits as rejection. A denial from a
    /// fallback engine is remembered while later engines run. Exhausting
    /// the chain without a grant is an authentication failure.
    pub async fn authenticate(&self, request: &RequestParams) -> Result<Identity> {
        let mut last_denial: Option<Error> = None;

        for (control, engine) in &self.engines {
            match engine.authenticate(request).await {
                AuthOutcome::Granted(identity) => {
                    debug!(engine = engine.name(), "authentication granted");
                    return Ok(identity);
                }
                AuthOutcome::Denied(reason) if *control == Control::Sufficient => {
                    debug!(engine = engine.name(), reason = %reason, "authentication denied");
                    return Err(reason);
                }
                AuthOutcome::Denied(reason) => {
                    last_denial = Some(reason);
                }
                AuthOutcome::NotApplicable => {}
            }
        }

        Err(last_denial
            .unwrap_or_else(|| Error::unauthenticated("no authentication engine was applicable")))
    }
}

/// The web-identity token parameter consumed by the default strategy
struct WebIdentityTokenExtractor;

impl TokenExtractor for WebIdentityTokenExtractor {
    fn get_token(&self, request: &RequestParams) -> Option<String> {
        request.get_non_empty("WebIdentityToken").map(str::to_string)
    }
}

struct WebIdentityApplier;

impl WebIdentityApplierFactory for WebIdentityApplier {
    fn create_identity(
        &self,
        claims: &WebTokenClaims,
        role_session: &str,
        tenant: &str,
    ) -> Identity {
        Identity {
            subject: claims.subject.clone(),
            audience: claims.audience.clone(),
            issuer: claims.issuer.clone(),
            tenant: tenant.to_string(),
            role_session_name: role_session.to_string(),
        }
    }
}

/// The default configuration: exactly one web-token engine, sufficient
pub struct DefaultStrategy {
    strategy: Strategy,
}

impl DefaultStrategy {
    pub fn new(
        registry: ProviderRegistry,
        verifier: Arc<dyn SignatureVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engine = WebTokenEngine::new(
            registry,
            verifier,
            clock,
            Arc::new(WebIdentityTokenExtractor),
            Arc::new(WebIdentityApplier),
        );
        let mut strategy = Strategy::new();
        strategy.add_engine(Control::Sufficient, Arc::new(engine));
        Self { strategy }
    }

    pub async fn authenticate(&self, request: &RequestParams) -> Result<Identity> {
        self.strategy.authenticate(request).await
    }
}
