use super::SecondFactorClient;
use crate::metrics;
use dualgate_core::config::SecondFactorConfig;
use dualgate_core::{DualgateConfig, Result};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Verifies a one-time code for a user
pub struct SecondFactorAuthenticator {
    username: String,
    config: SecondFactorConfig,
    bypass: bool,
    client: Arc<dyn SecondFactorClient>,
}

impl SecondFactorAuthenticator {
    pub fn new(
        username: &str,
        config: &DualgateConfig,
        client: Arc<dyn SecondFactorClient>,
    ) -> Result<Self> {
        config.second_factor.validate()?;
        config.bypass.validate(config.debug)?;

        Ok(Self {
            username: username.to_string(),
            config: config.second_factor.clone(),
            bypass: config.effective_bypass().second_factor,
            client,
        })
    }

    /// Check `code` with the second factor service; any fault reports `false`
    pub async fn check(&self, code: &str) -> bool {
        if self.bypass {
            warn!("Second factor check bypassed for {} (debug mode)", self.username);
            metrics::record_second_factor_check("bypassed");
            return true;
        }

        debug!("Checking second factor for {}", self.username);

        match self
            .client
            .authenticate(&self.config.secret, &self.username, code, &self.config.server)
            .await
        {
            Ok(true) => {
                metrics::record_second_factor_check("success");
                true
            }
            Ok(false) => {
                warn!("Second factor code rejected for {}", self.username);
                metrics::record_second_factor_check("rejected");
                false
            }
            Err(e) => {
                error!(
                    "Unable to authenticate against second factor server {}: {}",
                    self.config.server, e
                );
                metrics::record_second_factor_check("error");
                false
            }
        }
    }
}
