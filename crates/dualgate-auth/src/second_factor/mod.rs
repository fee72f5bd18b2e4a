//! One-time code verification against a second factor service

mod authenticator;
mod radius;

pub use self::authenticator::SecondFactorAuthenticator;
pub use self::radius::RadiusClient;

use async_trait::async_trait;
use dualgate_core::Result;

/// Client for a second factor (RADIUS-like) service
#[async_trait]
pub trait SecondFactorClient: Send + Sync {
    /// Ask `server` whether `code` is valid for `username`.
    ///
    /// Network and protocol faults are reported as `Error::ServiceFault`.
    async fn authenticate(
        &self,
        secret: &str,
        username: &str,
        code: &str,
        server: &str,
    ) -> Result<bool>;
}
