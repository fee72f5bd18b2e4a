//! Two-factor credential verification for Dualgate
//!
//! A password is bound against a directory service, a one-time code is
//! checked against a second factor service, and only when both pass are the
//! identity attributes resolved from the identity store.

pub mod attributes;
pub mod directory;
pub mod metrics;
pub mod retry;
pub mod second_factor;
pub mod verifier;

#[cfg(test)]
mod testing;

pub use attributes::AttributeResolver;
pub use directory::{
    DirectoryAuthenticator, DirectoryClient, DirectoryConnection, DirectoryEndpoint,
    LdapDirectoryClient,
};
pub use retry::{RetryError, RetryPolicy};
pub use second_factor::{RadiusClient, SecondFactorAuthenticator, SecondFactorClient};
pub use verifier::{Backends, CredentialVerifier, Outcome, Verification};
