use async_trait::async_trait;
use axum::http::request::Parts;
use stagehand_core::ServiceProvider;

use super::policy::AuthorizationPolicy;
use super::principal::AuthenticateResult;
use super::service::AuthenticationService;
use crate::errors::HttpResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAuthorizationResult {
    Success,
    /// Not authenticated; answered with 401
    Challenge,
    /// Authenticated but not allowed; answered with 403
    Forbid,
}

/// Authenticates a request and authorizes it against a policy
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    async fn authenticate(
        &self,
        policy: &AuthorizationPolicy,
        request: &Parts,
        services: &ServiceProvider,
    ) -> HttpResult<AuthenticateResult>;

    async fn authorize(
        &self,
        policy: &AuthorizationPolicy,
        authentication: &AuthenticateResult,
        request: &Parts,
        services: &ServiceProvider,
    ) -> HttpResult<PolicyAuthorizationResult>;
}

/// Evaluator backed by the registered [`AuthenticationService`]
///
/// The service is resolved per evaluation, so a host without one fails the
/// request with a service resolution error instead of failing at startup.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPolicyEvaluator;

#[async_trait]
impl PolicyEvaluator for DefaultPolicyEvaluator {
    async fn authenticate(
        &self,
        _policy: &AuthorizationPolicy,
        request: &Parts,
        services: &ServiceProvider,
    ) -> HttpResult<AuthenticateResult> {
        let authentication = services.resolve::<AuthenticationService>()?;
        Ok(authentication.authenticate(&request.headers))
    }

    async fn authorize(
        &self,
        policy: &AuthorizationPolicy,
        authentication: &AuthenticateResult,
        _request: &Parts,
        _services: &ServiceProvider,
    ) -> HttpResult<PolicyAuthorizationResult> {
        let anonymous = super::principal::ClaimsPrincipal::anonymous();
        let principal = authentication.principal().unwrap_or(&anonymous);

        Ok(if policy.is_satisfied_by(principal) {
            PolicyAuthorizationResult::Success
        } else if authentication.succeeded() {
            PolicyAuthorizationResult::Forbid
        } else {
            PolicyAuthorizationResult::Challenge
        })
    }
}
