//! LDAP directory client
//!
//! Supports LDAP and LDAPS connections through `ldap3`.

use super::{DirectoryClient, DirectoryConnection, DirectoryEndpoint};
use async_trait::async_trait;
use dualgate_core::{Error, Result};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError};
use std::time::Duration;
use tracing::debug;

// LDAP result codes (RFC 4511)
const RC_SUCCESS: u32 = 0;
const RC_INVALID_CREDENTIALS: u32 = 49;
const RC_BUSY: u32 = 51;
const RC_UNAVAILABLE: u32 = 52;

/// Directory client backed by `ldap3`
#[derive(Debug, Clone, Copy, Default)]
pub struct LdapDirectoryClient;

impl LdapDirectoryClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DirectoryClient for LdapDirectoryClient {
    async fn connect(&self, endpoint: &DirectoryEndpoint) -> Result<Box<dyn DirectoryConnection>> {
        let settings = LdapConnSettings::new().set_conn_timeout(endpoint.connect_timeout);
        let url = endpoint.url();

        debug!("Connecting to LDAP server: {}", url);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| Error::Connectivity(format!("Can't contact LDAP server {}: {}", url, e)))?;

        ldap3::drive!(conn);

        Ok(Box::new(LdapConnection {
            ldap,
            bind_timeout: endpoint.bind_timeout,
        }))
    }
}

struct LdapConnection {
    ldap: Ldap,
    bind_timeout: Option<Duration>,
}

#[async_trait]
impl DirectoryConnection for LdapConnection {
    async fn bind(&mut self, bind_identity: &str, password: &str) -> Result<bool> {
        if let Some(timeout) = self.bind_timeout {
            self.ldap.with_timeout(timeout);
        }

        let result = self
            .ldap
            .simple_bind(bind_identity, password)
            .await
            .map_err(classify_ldap_error)?;

        classify_bind_code(result.rc)
    }

    async fn unbind(&mut self) {
        if let Err(e) = self.ldap.unbind().await {
            debug!("LDAP unbind failed: {}", e);
        }
    }
}

/// Map an LDAP bind result code onto the bind contract
pub fn classify_bind_code(rc: u32) -> Result<bool> {
    match rc {
        RC_SUCCESS => Ok(true),
        RC_INVALID_CREDENTIALS => Ok(false),
        RC_BUSY | RC_UNAVAILABLE => Err(Error::Connectivity(format!(
            "Directory server unavailable (code {})",
            rc
        ))),
        _ => Err(Error::Credential(format!("Bind failed with code: {}", rc))),
    }
}

fn classify_ldap_error(error: LdapError) -> Error {
    match error {
        LdapError::Io { .. } | LdapError::EndOfStream | LdapError::Timeout { .. } => {
            Error::Connectivity(format!("Connection lost during bind: {}", error))
        }
        other => Error::Credential(format!("Bind protocol error: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_code_classification() {
        assert!(classify_bind_code(0).unwrap());
        assert!(!classify_bind_code(49).unwrap());
        assert!(classify_bind_code(52).unwrap_err().is_transient());
        assert!(classify_bind_code(51).unwrap_err().is_transient());

        // Account locked / unwilling to perform are permanent
        assert!(matches!(classify_bind_code(53), Err(Error::Credential(_))));
        assert!(matches!(classify_bind_code(775), Err(Error::Credential(_))));
    }

    #[test]
    fn test_ldap_error_classification() {
        let dropped = classify_ldap_error(LdapError::EndOfStream);
        assert!(matches!(dropped, Error::Connectivity(_)));
        assert!(dropped.is_transient());

        let protocol = classify_ldap_error(LdapError::UnknownScheme("ftp".to_string()));
        assert!(matches!(protocol, Error::Credential(_)));
        assert!(!protocol.is_transient());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connectivity_error() {
        let endpoint = DirectoryEndpoint {
            host: "127.0.0.1".to_string(),
            // Port 1 is reserved and not listening in test environments
            port: 1,
            use_tls: false,
            connect_timeout: Duration::from_secs(2),
            bind_timeout: None,
        };

        let result = LdapDirectoryClient::new().connect(&endpoint).await;
        assert!(matches!(result, Err(Error::Connectivity(_))));
    }
}
