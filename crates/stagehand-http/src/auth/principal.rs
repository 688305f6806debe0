use std::collections::BTreeMap;

use serde::Serialize;

/// Identity attached to a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimsPrincipal {
    pub subject: Option<String>,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub claims: BTreeMap<String, serde_json::Value>,
    /// Scheme that produced the identity, `None` for anonymous
    pub authentication_type: Option<String>,
}

impl ClaimsPrincipal {
    /// Authenticated principal for `subject`
    pub fn new(subject: impl Into<String>, authentication_type: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            name: None,
            roles: Vec::new(),
            claims: BTreeMap::new(),
            authentication_type: Some(authentication_type.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            subject: None,
            name: None,
            roles: Vec::new(),
            claims: BTreeMap::new(),
            authentication_type: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.claims.insert(key.into(), value.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication_type.is_some()
    }

    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Outcome of authenticating a request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthenticateResult {
    Success(ClaimsPrincipal),
    /// No credentials were presented
    NoResult,
    /// Credentials were presented but rejected
    Fail(String),
}

impl AuthenticateResult {
    pub fn succeeded(&self) -> bool {
        matches!(self, AuthenticateResult::Success(_))
    }

    pub fn principal(&self) -> Option<&ClaimsPrincipal> {
        match self {
            AuthenticateResult::Success(principal) => Some(principal),
            _ => None,
        }
    }

    pub fn into_principal(self) -> Option<ClaimsPrincipal> {
        match self {
            AuthenticateResult::Success(principal) => Some(principal),
            _ => None,
        }
    }
}
