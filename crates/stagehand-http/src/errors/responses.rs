//! HTTP error response formatting

use super::HttpError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use stagehand_core::{ApiError, ApiErrorResponse};
use tracing::error;

impl HttpError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            HttpError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            HttpError::NotFound { .. } => StatusCode::NOT_FOUND,
            HttpError::Conflict { .. } => StatusCode::CONFLICT,
            HttpError::Unauthorized => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden { .. } => StatusCode::FORBIDDEN,
            HttpError::Configuration(_)
            | HttpError::ServiceResolution { .. }
            | HttpError::Server { .. }
            | HttpError::Datastore { .. }
            | HttpError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short guidance included with the error body
    pub fn error_hint(&self) -> Option<&'static str> {
        match self {
            HttpError::BadRequest { .. } => Some("Check request format and parameters"),
            HttpError::ServiceResolution { .. } => {
                Some("Check that the service is registered in configure_services")
            }
            HttpError::Unauthorized => Some("Provide a valid bearer token"),
            _ => None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), "{}", self);
        }

        let body: ApiErrorResponse = ApiError::new(self.error_code(), self.to_string())
            .with_hint(self.error_hint())
            .into();
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(HttpError::bad_request("test").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(HttpError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            HttpError::forbidden("inventory.write").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            HttpError::validation("quantity must not exceed 500").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            HttpError::from(stagehand_core::CoreError::service_not_found("Clock")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_hints() {
        assert_eq!(
            HttpError::Unauthorized.error_hint(),
            Some("Provide a valid bearer token")
        );
        assert_eq!(HttpError::not_found("User").error_hint(), None);
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = HttpError::not_found("items/42").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");
        assert_eq!(body["error"]["message"], "Not found: items/42");
        assert!(body["error"]["hint"].is_null());
    }
}
