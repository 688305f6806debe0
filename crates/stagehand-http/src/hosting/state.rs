use std::ops::Deref;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use stagehand_core::ServiceProvider;

use super::context::HostContext;
use crate::errors::HttpError;

/// Router state shared by every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub services: ServiceProvider,
    pub context: HostContext,
}

/// Service scope of the current request
///
/// Inserted into the request extensions by [`super::request_scope`].
#[derive(Debug, Clone)]
pub struct RequestServices(pub ServiceProvider);

impl RequestServices {
    pub fn from_parts(parts: &Parts) -> Result<ServiceProvider, HttpError> {
        parts
            .extensions
            .get::<RequestServices>()
            .map(|services| services.0.clone())
            .ok_or_else(|| HttpError::internal("request has no service scope; route it through WebHost"))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestServices
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(Self::from_parts(parts)?))
    }
}

/// Extractor resolving capability `T` from the request scope
pub struct Inject<T: ?Sized>(pub Arc<T>);

impl<T: ?Sized> Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for Inject<T>
where
    T: ?Sized + Send + Sync + 'static,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let services = RequestServices::from_parts(parts)?;
        Ok(Self(services.resolve::<T>()?))
    }
}
