//! Error types for Dualgate

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Construction Errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    // Directory Errors
    #[error("Directory server unreachable: {0}")]
    Connectivity(String),

    #[error("Directory bind rejected: {0}")]
    Credential(String),

    // Second Factor Errors
    #[error("Second factor service fault: {0}")]
    ServiceFault(String),

    // Identity Store Errors
    #[error("Identity not found: {0}")]
    NotFound(String),

    #[error("Identity store error: {0}")]
    Store(String),
}

/// Failure categories that drive retry and propagation decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// Missing or invalid settings; fatal, surfaced to the caller
    Configuration,
    /// Service could not be reached; eligible for retry
    TransientConnectivity,
    /// Credentials rejected or protocol fault; never retried
    PermanentCredential,
    /// Second factor service failure
    ServiceFault,
    /// Identity record absent
    NotFound,
    /// Identity store backend failure
    Internal,
}

impl Error {
    pub fn category(&self) -> FailureCategory {
        match self {
            Error::Configuration(_) | Error::InvalidUsername(_) => FailureCategory::Configuration,
            Error::Connectivity(_) => FailureCategory::TransientConnectivity,
            Error::Credential(_) => FailureCategory::PermanentCredential,
            Error::ServiceFault(_) => FailureCategory::ServiceFault,
            Error::NotFound(_) => FailureCategory::NotFound,
            Error::Store(_) => FailureCategory::Internal,
        }
    }

    /// Whether the operation that produced this error may be attempted again
    pub fn is_transient(&self) -> bool {
        self.category() == FailureCategory::TransientConnectivity
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "ConfigurationError",
            Error::InvalidUsername(_) => "InvalidUsername",
            Error::Connectivity(_) => "ConnectivityError",
            Error::Credential(_) => "CredentialError",
            Error::ServiceFault(_) => "ServiceFault",
            Error::NotFound(_) => "NotFound",
            Error::Store(_) => "StoreError",
        }
    }
}
