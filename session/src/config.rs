//! Session configuration handed to the vendor widget.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use kycgate_types::UserId;

use crate::SessionError;

/// Required prefix of vendor inquiry template identifiers.
pub const TEMPLATE_PREFIX: &str = "itmpl_";

/// Default routing hint when none is given.
pub const DEFAULT_ROUTING_COUNTRY: &str = "US";

/// Vendor environment a session runs against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the widget needs to open a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub template_id: String,
    pub environment: Environment,
    pub routing_country: String,
    /// Echoed back by the vendor in webhooks as `referenceId`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<UserId>,
}

impl SessionConfig {
    pub fn new(template_id: impl Into<String>) -> Result<Self, SessionError> {
        let template_id = template_id.into();
        if !template_id.starts_with(TEMPLATE_PREFIX) || template_id.len() == TEMPLATE_PREFIX.len()
        {
            return Err(SessionError::InvalidTemplate(template_id));
        }
        Ok(Self {
            template_id,
            environment: Environment::default(),
            routing_country: DEFAULT_ROUTING_COUNTRY.to_string(),
            reference_id: None,
        })
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Blank hints fall back to [`DEFAULT_ROUTING_COUNTRY`].
    pub fn with_routing_country(mut self, country: impl Into<String>) -> Self {
        let country = country.into();
        self.routing_country = if country.trim().is_empty() {
            DEFAULT_ROUTING_COUNTRY.to_string()
        } else {
            country.trim().to_ascii_uppercase()
        };
        self
    }

    pub fn with_reference_id(mut self, user: UserId) -> Self {
        self.reference_id = Some(user);
        self
    }
}
