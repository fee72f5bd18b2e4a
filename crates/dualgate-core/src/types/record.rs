//! Identity store records

use super::Attributes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attribute keys released for a verified identity, in projection order
pub const PROJECTED_ATTRIBUTES: [&str; 5] =
    ["first_name", "last_name", "email", "username", "is_active"];

/// Profile record held by the identity store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl IdentityRecord {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// The fixed attribute projection released to callers
    pub fn project(&self) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("first_name".into(), self.first_name.clone().into());
        attributes.insert("last_name".into(), self.last_name.clone().into());
        attributes.insert("email".into(), self.email.clone().into());
        attributes.insert("username".into(), self.username.clone().into());
        attributes.insert("is_active".into(), self.is_active.into());
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_has_exactly_the_released_keys() {
        let record = IdentityRecord::new("alice")
            .with_name("Alice", "Liddell")
            .with_email("alice@example.com");

        let attributes = record.project();
        assert_eq!(attributes.len(), PROJECTED_ATTRIBUTES.len());
        for key in PROJECTED_ATTRIBUTES {
            assert!(attributes.contains_key(key), "missing {}", key);
        }
        assert!(!attributes.contains_key("id"));
        assert!(!attributes.contains_key("created_at"));
        assert_eq!(attributes["is_active"], serde_json::Value::Bool(true));
        assert_eq!(attributes["last_name"], serde_json::Value::from("Liddell"));
    }
}
