use super::{DirectoryClient, DirectoryEndpoint};
use crate::metrics;
use crate::retry::{RetryError, RetryPolicy};
use dualgate_core::{DualgateConfig, Error, Result};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Verifies a user's password with a directory bind
pub struct DirectoryAuthenticator {
    username: String,
    bind_identity: String,
    endpoint: DirectoryEndpoint,
    policy: RetryPolicy,
    bypass: bool,
    client: Arc<dyn DirectoryClient>,
}

impl DirectoryAuthenticator {
    pub fn new(
        username: &str,
        config: &DualgateConfig,
        client: Arc<dyn DirectoryClient>,
    ) -> Result<Self> {
        config.directory.validate()?;
        config.bypass.validate(config.debug)?;

        Ok(Self {
            username: username.to_string(),
            bind_identity: config.directory.bind_identity(username),
            endpoint: DirectoryEndpoint::from_config(&config.directory),
            policy: RetryPolicy::from_directory(&config.directory),
            bypass: config.effective_bypass().directory,
            client,
        })
    }

    /// Check `password` against the directory.
    ///
    /// Never fails: unreachable servers, rejected binds and protocol faults
    /// all report `false`.
    pub async fn check(&self, password: &str) -> bool {
        if password.is_empty() {
            debug!("Empty password for {}, skipping directory", self.username);
            metrics::record_directory_check("empty");
            return false;
        }

        if self.bypass {
            warn!("Directory check bypassed for {} (debug mode)", self.username);
            metrics::record_directory_check("bypassed");
            return true;
        }

        debug!("Checking directory password for {}", self.username);

        let result = self
            .policy
            .run(|attempt| self.attempt(attempt, password), Error::is_transient)
            .await;

        match result {
            Ok(true) => {
                debug!("Directory bind succeeded for {}", self.username);
                metrics::record_directory_check("success");
                true
            }
            Ok(false) => {
                warn!("Directory rejected credentials for {}", self.username);
                metrics::record_directory_check("rejected");
                false
            }
            Err(RetryError::Permanent { error, .. }) => {
                warn!("Directory bind failed for {}: {}", self.username, error);
                metrics::record_directory_check("rejected");
                false
            }
            Err(RetryError::Exhausted { attempts, error }) => {
                error!(
                    "Error connecting to directory {} after {} attempts: {}",
                    self.endpoint.url(),
                    attempts,
                    error
                );
                metrics::record_directory_check("unreachable");
                false
            }
        }
    }

    /// One connect/bind/release cycle
    async fn attempt(&self, attempt: u32, password: &str) -> Result<bool> {
        metrics::record_directory_attempt();
        debug!(
            "Initializing directory connection to {} (attempt {})",
            self.endpoint.url(),
            attempt
        );

        let mut connection = self.client.connect(&self.endpoint).await?;

        debug!("Attempting to bind as {}", self.bind_identity);
        let outcome = connection.bind(&self.bind_identity, password).await;
        connection.unbind().await;

        outcome
    }
}
