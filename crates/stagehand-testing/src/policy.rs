use async_trait::async_trait;
use axum::http::request::Parts;
use stagehand_core::ServiceProvider;
use stagehand_http::{
    AuthenticateResult, AuthorizationPolicy, ClaimsPrincipal, HttpResult,
    PolicyAuthorizationResult, PolicyEvaluator,
};

/// Authentication type stamped on the test principal
pub const TEST_SCHEME: &str = "Test";

/// Evaluator that lets every request through
///
/// Every request authenticates as the same fixed principal and every policy
/// is satisfied, whatever roles it requires.
#[derive(Debug, Clone)]
pub struct TestingPolicyEvaluator {
    principal: ClaimsPrincipal,
}

impl TestingPolicyEvaluator {
    pub const DEFAULT_SUBJECT: &'static str = "integration-test-user";

    pub fn new() -> Self {
        Self::with_principal(
            ClaimsPrincipal::new(Self::DEFAULT_SUBJECT, TEST_SCHEME).with_name("Integration Test User"),
        )
    }

    pub fn with_principal(principal: ClaimsPrincipal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &ClaimsPrincipal {
        &self.principal
    }
}

impl Default for TestingPolicyEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyEvaluator for TestingPolicyEvaluator {
    async fn authenticate(
        &self,
        _policy: &AuthorizationPolicy,
        _request: &Parts,
        _services: &ServiceProvider,
    ) -> HttpResult<AuthenticateResult> {
        Ok(AuthenticateResult::Success(self.principal.clone()))
    }

    async fn authorize(
        &self,
        policy: &AuthorizationPolicy,
        _authentication: &AuthenticateResult,
        _request: &Parts,
        _services: &ServiceProvider,
    ) -> HttpResult<PolicyAuthorizationResult> {
        tracing::trace!(policy = %policy.name, "policy granted by testing evaluator");
        Ok(PolicyAuthorizationResult::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use stagehand_core::ServiceCollection;

    #[tokio::test]
    async fn test_every_policy_is_granted() {
        let evaluator = TestingPolicyEvaluator::new();
        let provider = ServiceCollection::new().build_provider();
        let request = Request::builder().uri("/api/items").body(()).unwrap().into_parts().0;
        let policy = AuthorizationPolicy::new("inventory.write").require_role("inventory-writer");

        let authentication = evaluator.authenticate(&policy, &request, &provider).await.unwrap();
        let principal = authentication.principal().unwrap();
        assert_eq!(principal.subject.as_deref(), Some(TestingPolicyEvaluator::DEFAULT_SUBJECT));
        assert!(principal.is_authenticated());

        // Even an anonymous result is authorized
        assert_eq!(
            evaluator
                .authorize(&policy, &AuthenticateResult::NoResult, &request, &provider)
                .await
                .unwrap(),
            PolicyAuthorizationResult::Success
        );
    }

    #[tokio::test]
    async fn test_custom_principal() {
        let evaluator = TestingPolicyEvaluator::with_principal(
            ClaimsPrincipal::new("auditor", TEST_SCHEME).with_role("inventory-auditor"),
        );
        let provider = ServiceCollection::new().build_provider();
        let request = Request::builder().body(()).unwrap().into_parts().0;

        let authentication = evaluator
            .authenticate(&AuthorizationPolicy::new("any"), &request, &provider)
            .await
            .unwrap();
        assert!(authentication.principal().unwrap().is_in_role("inventory-auditor"));
    }
}
