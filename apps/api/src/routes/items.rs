use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stagehand_http::{AppState, Authorized, DbContext, HttpError, Inject};
use tracing::info;
use uuid::Uuid;

use crate::{InventoryDbContext, InventorySettings, InventoryWrite, ITEMS_COLLECTION};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItem {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
}

impl CreateItem {
    fn validate(&self, settings: &InventorySettings) -> Result<(), HttpError> {
        if self.sku.trim().is_empty() {
            return Err(HttpError::validation("sku must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(HttpError::validation("name must not be empty"));
        }
        if self.quantity > settings.max_quantity {
            return Err(HttpError::validation(format!(
                "quantity must not exceed {}",
                settings.max_quantity
            )));
        }
        Ok(())
    }
}

pub fn router() -> axum::Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).delete(delete_item))
}

async fn list_items(Inject(db): Inject<InventoryDbContext>) -> Result<Json<Vec<Item>>, HttpError> {
    let items = db
        .store()
        .list(ITEMS_COLLECTION)
        .await?
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<Item>, _>>()?;
    Ok(Json(items))
}

async fn get_item(
    Inject(db): Inject<InventoryDbContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, HttpError> {
    let document = db
        .store()
        .get(ITEMS_COLLECTION, &id.to_string())
        .await?
        .ok_or_else(|| HttpError::not_found(format!("item {}", id)))?;
    Ok(Json(serde_json::from_value(document)?))
}

async fn create_item(
    auth: Authorized<InventoryWrite>,
    Inject(db): Inject<InventoryDbContext>,
    Inject(settings): Inject<InventorySettings>,
    Json(payload): Json<CreateItem>,
) -> Result<(StatusCode, Json<Item>), HttpError> {
    payload.validate(&settings)?;

    let item = Item {
        id: Uuid::new_v4(),
        sku: payload.sku,
        name: payload.name,
        quantity: payload.quantity,
        created_by: auth.principal.subject,
        created_at: Utc::now(),
    };
    db.store()
        .insert(ITEMS_COLLECTION, &item.id.to_string(), serde_json::to_value(&item)?)
        .await?;

    info!(item = %item.id, sku = %item.sku, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn delete_item(
    _auth: Authorized<InventoryWrite>,
    Inject(db): Inject<InventoryDbContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpError> {
    if db.store().remove(ITEMS_COLLECTION, &id.to_string()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::not_found(format!("item {}", id)))
    }
}
