//! User identities and verification roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::KycError;

/// Identity used when a request does not name a user.
pub const DEMO_USER: &str = "demo-user";

/// Longest accepted user id, in bytes.
pub const MAX_USER_ID_LEN: usize = 128;

/// An opaque user identity. Never empty, at most [`MAX_USER_ID_LEN`] bytes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, KycError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(KycError::Validation("user id must not be empty".into()));
        }
        if trimmed.len() > MAX_USER_ID_LEN {
            return Err(KycError::Validation(format!(
                "user id must be at most {MAX_USER_ID_LEN} bytes"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The single hardcoded user of the demo deployment.
    pub fn demo() -> Self {
        Self(DEMO_USER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = KycError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Each user has one independent verification record per role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Buyer, Role::Seller];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
        }
    }
}

impl FromStr for Role {
    type Err = KycError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            other => Err(KycError::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_exact_names_only() {
        assert_eq!("buyer".parse::<Role>(), Ok(Role::Buyer));
        assert_eq!("seller".parse::<Role>(), Ok(Role::Seller));
        assert_eq!(
            "Buyer".parse::<Role>(),
            Err(KycError::InvalidRole("Buyer".into()))
        );
        assert!("".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn user_id_is_trimmed_and_non_empty() {
        assert_eq!(UserId::new("  alice ").unwrap().as_str(), "alice");
        assert!(matches!(UserId::new("   "), Err(KycError::Validation(_))));
    }

    #[test]
    fn user_id_length_is_capped() {
        assert!(UserId::new("a".repeat(MAX_USER_ID_LEN)).is_ok());
        assert!(matches!(
            UserId::new("a".repeat(MAX_USER_ID_LEN + 1)),
            Err(KycError::Validation(_))
        ));
    }

    #[test]
    fn user_id_deserialization_rejects_empty() {
        let parsed: Result<UserId, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
    }
}
