//! Identity store trait
//!
//! Defines the lookup interface used by attribute resolution.

use async_trait::async_trait;
use dualgate_core::types::IdentityRecord;
use dualgate_core::Result;

/// Read access to identity profile records
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fetch the record for `username`.
    ///
    /// Returns `Error::NotFound` when no record exists and `Error::Store`
    /// when the backend fails.
    async fn get(&self, username: &str) -> Result<IdentityRecord>;
}
