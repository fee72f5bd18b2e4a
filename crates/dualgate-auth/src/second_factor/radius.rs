//! RADIUS second factor client
//!
//! Sends a PAP Access-Request carrying the one-time code as the
//! User-Password attribute.

use super::SecondFactorClient;
use ::radius::client::Client;
use ::radius::core::code::Code;
use ::radius::core::packet::Packet;
use ::radius::core::rfc2865;
use async_trait::async_trait;
use dualgate_core::config::SecondFactorConfig;
use dualgate_core::{Error, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Second factor client speaking RADIUS
#[derive(Debug, Clone)]
pub struct RadiusClient {
    timeout: Duration,
}

impl RadiusClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &SecondFactorConfig) -> Self {
        Self::new(config.timeout())
    }
}

impl Default for RadiusClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

async fn resolve(server: &str) -> Result<SocketAddr> {
    tokio::net::lookup_host(server)
        .await
        .map_err(|e| Error::ServiceFault(format!("Unable to resolve {}: {}", server, e)))?
        .next()
        .ok_or_else(|| Error::ServiceFault(format!("No address for {}", server)))
}

#[async_trait]
impl SecondFactorClient for RadiusClient {
    async fn authenticate(
        &self,
        secret: &str,
        username: &str,
        code: &str,
        server: &str,
    ) -> Result<bool> {
        let remote = resolve(server).await?;

        let mut request = Packet::new(Code::AccessRequest, secret.as_bytes());
        rfc2865::add_user_name(&mut request, username);
        rfc2865::add_user_password(&mut request, code.as_bytes())
            .map_err(|e| Error::ServiceFault(format!("Invalid User-Password: {:?}", e)))?;

        debug!("Sending RADIUS Access-Request to {}", remote);

        let client = Client::new(Some(self.timeout), Some(self.timeout));
        let response = client
            .send_packet(&remote, &request)
            .await
            .map_err(|e| Error::ServiceFault(format!("RADIUS request to {} failed: {:?}", server, e)))?;

        match response.get_code() {
            Code::AccessAccept => Ok(true),
            Code::AccessReject | Code::AccessChallenge => Ok(false),
            other => Err(Error::ServiceFault(format!(
                "Unexpected RADIUS response code: {:?}",
                other
            ))),
        }
    }
}
