use std::marker::PhantomData;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

use super::evaluator::{PolicyAuthorizationResult, PolicyEvaluator};
use super::policy::AuthorizationOptions;
use super::principal::ClaimsPrincipal;
use crate::errors::HttpError;
use crate::hosting::RequestServices;

/// Marker naming a registered authorization policy
pub trait PolicyName: Send + Sync + 'static {
    const NAME: &'static str;
}

/// Extractor that admits the request only if policy `P` succeeds
///
/// Rejects with 401 when the evaluator challenges and 403 when it forbids.
#[derive(Debug, Clone)]
pub struct Authorized<P: PolicyName> {
    pub principal: ClaimsPrincipal,
    _policy: PhantomData<fn() -> P>,
}

impl<P: PolicyName> Authorized<P> {
    pub fn principal(&self) -> &ClaimsPrincipal {
        &self.principal
    }
}

#[async_trait]
impl<P, S> FromRequestParts<S> for Authorized<P>
where
    P: PolicyName,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let services = RequestServices::from_parts(parts)?;

        let options = services.resolve::<AuthorizationOptions>()?;
        let policy = options.get_policy(P::NAME).ok_or_else(|| {
            HttpError::internal(format!("authorization policy '{}' is not registered", P::NAME))
        })?;
        let evaluator = services.resolve::<dyn PolicyEvaluator>()?;

        let authentication = evaluator.authenticate(policy, parts, &services).await?;
        let outcome = evaluator
            .authorize(policy, &authentication, parts, &services)
            .await?;
        debug!(policy = P::NAME, ?outcome, "authorization evaluated");

        match outcome {
            PolicyAuthorizationResult::Success => Ok(Self {
                principal: authentication
                    .into_principal()
                    .unwrap_or_else(ClaimsPrincipal::anonymous),
                _policy: PhantomData,
            }),
            PolicyAuthorizationResult::Challenge => Err(HttpError::Unauthorized),
            PolicyAuthorizationResult::Forbid => Err(HttpError::forbidden(P::NAME)),
        }
    }
}
