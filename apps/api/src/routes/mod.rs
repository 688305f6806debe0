mod items;

use axum::routing::get;
use axum::Router;
use stagehand_http::{health_endpoint, AppState};

pub use items::{CreateItem, Item};

pub fn register(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/health", get(health_endpoint))
        .nest("/api/items", items::router())
}
