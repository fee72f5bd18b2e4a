//! Two-factor verification orchestration
//!
//! Directory password first, then the one-time code, then attribute
//! resolution. The first failing step ends the attempt, and an identity is
//! never reported verified without its attributes.

use crate::attributes::AttributeResolver;
use crate::directory::{DirectoryAuthenticator, DirectoryClient};
use crate::metrics;
use crate::second_factor::{SecondFactorAuthenticator, SecondFactorClient};
use dualgate_core::types::{Attributes, Identity};
use dualgate_core::{DualgateConfig, Result};
use dualgate_store::IdentityStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Collaborator clients shared by every verifier
#[derive(Clone)]
pub struct Backends {
    pub directory: Arc<dyn DirectoryClient>,
    pub second_factor: Arc<dyn SecondFactorClient>,
    pub store: Arc<dyn IdentityStore>,
}

impl Backends {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        second_factor: Arc<dyn SecondFactorClient>,
        store: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            directory,
            second_factor,
            store,
        }
    }
}

/// Where a verification attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Verified,
    DirectoryRejected,
    SecondFactorRejected,
    AttributesUnavailable,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Verified => "verified",
            Outcome::DirectoryRejected => "directory_rejected",
            Outcome::SecondFactorRejected => "second_factor_rejected",
            Outcome::AttributesUnavailable => "attributes_unavailable",
        }
    }
}

/// Result of [`CredentialVerifier::verify`]
#[derive(Debug, Clone, Serialize)]
pub struct Verification {
    pub outcome: Outcome,
    pub identity: Identity,
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        self.identity.is_verified()
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        self.identity.attributes()
    }

    pub fn into_identity(self) -> Identity {
        self.identity
    }
}

/// Single-use verifier for one authentication request
pub struct CredentialVerifier {
    identity: Identity,
    directory: DirectoryAuthenticator,
    second_factor: SecondFactorAuthenticator,
    attributes: AttributeResolver,
}

impl CredentialVerifier {
    /// Validate `config` and prepare a verifier for `username`.
    ///
    /// Fails with `Error::Configuration` when a required setting is missing,
    /// before any service is contacted.
    pub fn new(username: &str, config: &DualgateConfig, backends: &Backends) -> Result<Self> {
        config.validate()?;
        let identity = Identity::new(username)?;

        Ok(Self {
            directory: DirectoryAuthenticator::new(username, config, backends.directory.clone())?,
            second_factor: SecondFactorAuthenticator::new(
                username,
                config,
                backends.second_factor.clone(),
            )?,
            attributes: AttributeResolver::new(backends.store.clone()),
            identity,
        })
    }

    pub fn username(&self) -> &str {
        self.identity.username()
    }

    /// Verify `password` and `code`, consuming the verifier
    pub async fn verify(self, password: &str, code: &str) -> Verification {
        let started = Instant::now();
        debug!("Testing password for {}", self.identity);

        let outcome = self.evaluate(password, code).await;
        let verification = match outcome {
            Ok(attributes) => {
                info!("Verified {}", self.identity);
                Verification {
                    outcome: Outcome::Verified,
                    identity: self.identity.verified(attributes),
                }
            }
            Err(outcome) => {
                info!("Verification failed for {}: {}", self.identity, outcome.as_str());
                Verification {
                    outcome,
                    identity: self.identity,
                }
            }
        };

        metrics::record_verification(
            verification.outcome.as_str(),
            started.elapsed().as_secs_f64(),
        );
        verification
    }

    async fn evaluate(&self, password: &str, code: &str) -> std::result::Result<Attributes, Outcome> {
        if !self.directory.check(password).await {
            return Err(Outcome::DirectoryRejected);
        }
        if !self.second_factor.check(code).await {
            return Err(Outcome::SecondFactorRejected);
        }

        debug!("Both factors valid for {}", self.identity);
        self.attributes
            .fetch(self.identity.username())
            .await
            .map_err(|_| Outcome::AttributesUnavailable)
    }
}
