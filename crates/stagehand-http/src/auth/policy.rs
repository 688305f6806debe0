use std::collections::HashMap;

use super::principal::ClaimsPrincipal;

/// Named set of requirements a principal must meet
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationPolicy {
    pub name: String,
    pub require_authenticated_user: bool,
    /// Any one of these roles satisfies the policy; empty means no role check
    pub required_roles: Vec<String>,
}

impl AuthorizationPolicy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            require_authenticated_user: false,
            required_roles: Vec::new(),
        }
    }

    pub fn require_authenticated_user(mut self) -> Self {
        self.require_authenticated_user = true;
        self
    }

    /// Require one of the listed roles; implies an authenticated user
    pub fn require_role(mut self, role: impl Into<String>) -> Self {
        self.require_authenticated_user = true;
        self.required_roles.push(role.into());
        self
    }

    pub fn is_satisfied_by(&self, principal: &ClaimsPrincipal) -> bool {
        if self.require_authenticated_user && !principal.is_authenticated() {
            return false;
        }
        self.required_roles.is_empty()
            || self.required_roles.iter().any(|role| principal.is_in_role(role))
    }
}

/// Registry of named policies
#[derive(Debug, Clone)]
pub struct AuthorizationOptions {
    policies: HashMap<String, AuthorizationPolicy>,
    pub default_policy: AuthorizationPolicy,
}

impl AuthorizationOptions {
    pub const DEFAULT_POLICY: &'static str = "default";

    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
            default_policy: AuthorizationPolicy::new(Self::DEFAULT_POLICY).require_authenticated_user(),
        }
    }

    /// Add or replace a policy under its name
    pub fn add_policy(&mut self, policy: AuthorizationPolicy) -> &mut Self {
        self.policies.insert(policy.name.clone(), policy);
        self
    }

    /// Look up a policy; [`Self::DEFAULT_POLICY`] maps to the default policy
    pub fn get_policy(&self, name: &str) -> Option<&AuthorizationPolicy> {
        match self.policies.get(name) {
            Some(policy) => Some(policy),
            None if name == Self::DEFAULT_POLICY => Some(&self.default_policy),
            None => None,
        }
    }

    pub fn policy_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.policies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for AuthorizationOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_policy() {
        let policy = AuthorizationPolicy::new("inventory.write").require_role("inventory-writer");

        let writer = ClaimsPrincipal::new("alice", "Bearer").with_role("inventory-writer");
        let reader = ClaimsPrincipal::new("bob", "Bearer").with_role("inventory-reader");

        assert!(policy.is_satisfied_by(&writer));
        assert!(!policy.is_satisfied_by(&reader));
        assert!(!policy.is_satisfied_by(&ClaimsPrincipal::anonymous()));
    }

    #[test]
    fn test_open_policy_allows_anonymous() {
        let policy = AuthorizationPolicy::new("public");
        assert!(policy.is_satisfied_by(&ClaimsPrincipal::anonymous()));
    }

    #[test]
    fn test_options_lookup() {
        let mut options = AuthorizationOptions::new();
        options.add_policy(AuthorizationPolicy::new("inventory.write").require_role("inventory-writer"));

        assert!(options.get_policy("inventory.write").is_some());
        assert!(options.get_policy("inventory.admin").is_none());
        assert!(options
            .get_policy(AuthorizationOptions::DEFAULT_POLICY)
            .unwrap()
            .require_authenticated_user);
        assert_eq!(options.policy_names(), vec!["inventory.write"]);
    }
}
