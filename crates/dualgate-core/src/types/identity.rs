//! Identity produced by a verification attempt

use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Attribute name to value mapping released for a verified identity
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// The subject of one verification attempt.
///
/// Attributes are only ever present on a verified identity; the only way to
/// attach them is [`Identity::verified`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<Attributes>,
    verified: bool,
}

impl Identity {
    /// Create an unverified identity; the username must not be blank
    pub fn new(username: impl Into<String>) -> Result<Self> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(Error::InvalidUsername("username must not be empty".into()));
        }

        Ok(Self {
            username,
            attributes: None,
            verified: false,
        })
    }

    /// Mark this identity verified and attach its attributes
    pub fn verified(self, attributes: Attributes) -> Self {
        Self {
            username: self.username,
            attributes: Some(attributes),
            verified: true,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        self.attributes.as_ref()
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}
