//! Identity attribute resolution

use crate::metrics;
use dualgate_core::types::Attributes;
use dualgate_core::Result;
use dualgate_store::IdentityStore;
use std::sync::Arc;
use tracing::{debug, error};

/// Resolves the released attribute projection for a username
pub struct AttributeResolver {
    store: Arc<dyn IdentityStore>,
}

impl AttributeResolver {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Fetch `first_name`, `last_name`, `email`, `username` and `is_active`.
    ///
    /// Missing records and store failures are errors, never an empty map.
    pub async fn fetch(&self, username: &str) -> Result<Attributes> {
        match self.store.get(username).await {
            Ok(record) => {
                debug!("Resolved identity record for {}", username);
                metrics::record_attribute_lookup(true);
                Ok(record.project())
            }
            Err(e) => {
                error!("Unable to resolve identity {}: {}", username, e);
                metrics::record_attribute_lookup(false);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{alice_record, FailingStore};
    use dualgate_core::types::PROJECTED_ATTRIBUTES;
    use dualgate_core::Error;
    use dualgate_store::MemoryIdentityStore;

    #[tokio::test]
    async fn test_fetch_projects_record() {
        let store = Arc::new(MemoryIdentityStore::with_records([alice_record()]));
        let resolver = AttributeResolver::new(store);

        let attributes = resolver.fetch("alice").await.unwrap();
        assert_eq!(attributes.len(), PROJECTED_ATTRIBUTES.len());
        assert_eq!(attributes["email"], serde_json::json!("alice@example.com"));
        assert_eq!(attributes["username"], serde_json::json!("alice"));
    }

    #[tokio::test]
    async fn test_not_found_is_distinct_failure() {
        let resolver = AttributeResolver::new(Arc::new(MemoryIdentityStore::new()));
        assert!(matches!(resolver.fetch("alice").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let resolver = AttributeResolver::new(Arc::new(FailingStore));
        assert!(matches!(resolver.fetch("alice").await, Err(Error::Store(_))));
    }
}
