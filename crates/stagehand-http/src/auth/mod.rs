//! Authentication and policy-based authorization
//!
//! Endpoints opt into a policy with the [`Authorized`] extractor. The policy
//! is looked up in [`AuthorizationOptions`] and handed to the registered
//! [`PolicyEvaluator`], which authenticates the request and decides between
//! success, challenge (401) and forbid (403).

pub mod evaluator;
pub mod extract;
pub mod policy;
pub mod principal;
pub mod service;

pub use evaluator::{DefaultPolicyEvaluator, PolicyAuthorizationResult, PolicyEvaluator};
pub use extract::{Authorized, PolicyName};
pub use policy::{AuthorizationOptions, AuthorizationPolicy};
pub use principal::{AuthenticateResult, ClaimsPrincipal};
pub use service::{AuthenticationService, JwtSettings, ServiceCollectionAuthExt};
