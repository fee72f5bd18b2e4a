//! Directory (LDAP/Active Directory) password verification
//!
//! The authenticator composes a bind identity, opens one scoped connection
//! per attempt and retries only when the server could not be reached.

mod authenticator;
mod ldap;

pub use authenticator::DirectoryAuthenticator;
pub use ldap::{classify_bind_code, LdapDirectoryClient};

use async_trait::async_trait;
use dualgate_core::config::DirectoryConfig;
use dualgate_core::Result;
use std::time::Duration;

/// Where and how to reach the directory service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEndpoint {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    /// Bounds connection establishment only
    pub connect_timeout: Duration,
    /// Bounds the bind exchange when set
    pub bind_timeout: Option<Duration>,
}

impl DirectoryEndpoint {
    pub fn from_config(config: &DirectoryConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            use_tls: config.use_tls,
            connect_timeout: config.connect_timeout(),
            bind_timeout: config.bind_timeout(),
        }
    }

    pub fn url(&self) -> String {
        let scheme = if self.use_tls { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

/// Opens connections to a directory service
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Connect to the directory.
    ///
    /// Fails with `Error::Connectivity` when the server cannot be reached.
    async fn connect(&self, endpoint: &DirectoryEndpoint) -> Result<Box<dyn DirectoryConnection>>;
}

/// A single open directory connection
#[async_trait]
pub trait DirectoryConnection: Send {
    /// Simple bind; `Ok(false)` when the credentials are rejected.
    ///
    /// Protocol faults are reported as `Error::Credential`, a dropped
    /// connection as `Error::Connectivity`.
    async fn bind(&mut self, bind_identity: &str, password: &str) -> Result<bool>;

    /// Release the connection. Never fails.
    async fn unbind(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let mut config = DirectoryConfig {
            host: "ad.example.com".to_string(),
            port: 389,
            ..Default::default()
        };
        assert_eq!(
            DirectoryEndpoint::from_config(&config).url(),
            "ldap://ad.example.com:389"
        );

        config.use_tls = true;
        config.port = 636;
        config.bind_timeout_secs = Some(7);
        let endpoint = DirectoryEndpoint::from_config(&config);
        assert_eq!(endpoint.url(), "ldaps://ad.example.com:636");
        assert_eq!(endpoint.connect_timeout, Duration::from_secs(5));
        assert_eq!(endpoint.bind_timeout, Some(Duration::from_secs(7)));
    }
}
