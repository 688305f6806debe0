use std::sync::Arc;

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use stagehand_core::{ConfigError, Configuration, CoreError, ServiceCollection};
use tracing::debug;

use super::evaluator::{DefaultPolicyEvaluator, PolicyEvaluator};
use super::policy::AuthorizationOptions;
use super::principal::{AuthenticateResult, ClaimsPrincipal};
use crate::errors::{HttpError, HttpResult};

pub const BEARER_SCHEME: &str = "Bearer";

/// JWT settings, read from the `auth` configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    pub issuer: String,
    pub audience: String,
    pub signing_key: String,
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: u64,
}

fn default_token_lifetime() -> u64 {
    3600
}

/// JWT claims carried by bearer tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
    iss: String,
    aud: String,
    exp: usize,
    iat: usize,
}

/// Validates HS256 bearer tokens and issues them
pub struct AuthenticationService {
    settings: JwtSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthenticationService {
    pub fn new(settings: JwtSettings) -> Result<Self, ConfigError> {
        if settings.signing_key.trim().is_empty() {
            return Err(ConfigError::missing_required(
                "auth.signing_key",
                "Set a non-empty HS256 signing key",
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(settings.signing_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.signing_key.as_bytes()),
            validation,
            settings,
        })
    }

    pub fn from_configuration(configuration: &Configuration) -> Result<Self, ConfigError> {
        Self::new(configuration.get::<JwtSettings>("auth")?)
    }

    pub fn settings(&self) -> &JwtSettings {
        &self.settings
    }

    /// Issue a token for `subject` carrying `roles`
    pub fn issue_token(&self, subject: &str, roles: &[&str]) -> HttpResult<String> {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: subject.to_string(),
            name: None,
            roles: roles.iter().map(|role| role.to_string()).collect(),
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            exp: now + self.settings.token_lifetime_secs as usize,
            iat: now,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| HttpError::internal(format!("Token generation error: {}", e)))
    }

    /// Validate a raw token into a principal
    pub fn validate_token(&self, token: &str) -> HttpResult<ClaimsPrincipal> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(error = %e, "bearer token rejected");
            HttpError::Unauthorized
        })?;

        let claims = data.claims;
        let mut principal = ClaimsPrincipal::new(claims.sub, BEARER_SCHEME)
            .with_claim("iss", claims.iss)
            .with_claim("exp", claims.exp);
        if let Some(name) = claims.name {
            principal = principal.with_name(name);
        }
        for role in claims.roles {
            principal = principal.with_role(role);
        }
        Ok(principal)
    }

    /// Authenticate from the `Authorization: Bearer` header
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthenticateResult {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return AuthenticateResult::NoResult;
        };
        let Some(token) = value
            .to_str()
            .ok()
            .and_then(|v| v.split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case(BEARER_SCHEME))
            .map(|(_, token)| token.trim())
        else {
            return AuthenticateResult::NoResult;
        };

        match self.validate_token(token) {
            Ok(principal) => AuthenticateResult::Success(principal),
            Err(_) => AuthenticateResult::Fail("invalid bearer token".to_string()),
        }
    }
}

impl std::fmt::Debug for AuthenticationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationService")
            .field("issuer", &self.settings.issuer)
            .field("audience", &self.settings.audience)
            .finish()
    }
}

/// Authentication and authorization registrations on a [`ServiceCollection`]
pub trait ServiceCollectionAuthExt {
    /// Register [`AuthenticationService`] built from the `auth` configuration section
    fn add_jwt_authentication(&mut self) -> &mut Self;

    /// Register the policy registry and [`DefaultPolicyEvaluator`]
    fn add_authorization<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut AuthorizationOptions);
}

impl ServiceCollectionAuthExt for ServiceCollection {
    fn add_jwt_authentication(&mut self) -> &mut Self {
        self.add_singleton(|services| {
            let configuration = services.resolve::<Configuration>()?;
            let service = AuthenticationService::from_configuration(&configuration)
                .map_err(CoreError::from)?;
            Ok(Arc::new(service))
        })
    }

    fn add_authorization<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut AuthorizationOptions),
    {
        let mut options = AuthorizationOptions::new();
        configure(&mut options);

        self.add_instance(Arc::new(options)).add_singleton(|_| {
            let evaluator: Arc<dyn PolicyEvaluator> = Arc::new(DefaultPolicyEvaluator);
            Ok(evaluator)
        })
    }
}
