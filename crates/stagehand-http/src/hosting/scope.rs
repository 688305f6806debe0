use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::trace;

use super::state::{AppState, RequestServices};

/// Middleware giving each request its own service scope
///
/// The scope, and every scoped service resolved from it, is dropped when
/// the response has been produced.
pub async fn request_scope(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let scope = state.services.create_scope();
    trace!(scope = ?scope.scope_id(), path = %request.uri().path(), "request scope opened");
    request.extensions_mut().insert(RequestServices(scope));
    next.run(request).await
}
