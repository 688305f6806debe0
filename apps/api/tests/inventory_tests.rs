use std::sync::Arc;

use inventory_api::routes::Item;
use inventory_api::{InventoryApp, InventoryDbContext, INVENTORY_WRITER_ROLE};
use serde_json::json;
use stagehand_core::ServiceCollection;
use stagehand_http::{
    init_logging, AuthenticationService, DbContextOptions, JwtSettings, LoggingConfig,
    NpgsqlHealthCheck, SqlServerHealthCheck,
};
use stagehand_testing::prelude::*;

fn setup() {
    let _ = init_logging(LoggingConfig::test());
}

fn host(enable_test_auth_policy: bool) -> TestHost {
    setup();
    create_test_host::<InventoryApp>(ServiceCollection::new(), enable_test_auth_policy).unwrap()
}

async fn create_item(client: &TestClient, sku: &str, quantity: u32) -> TestResponse {
    client
        .post("/api/items")
        .json(&json!({ "sku": sku, "name": format!("Item {}", sku), "quantity": quantity }))
        .unwrap()
        .send()
        .await
        .unwrap()
}

#[test]
fn test_production_infrastructure_is_swapped_out() {
    let host = host(false);
    let services = host.services();

    assert!(!services.contains::<AuthenticationService>());
    assert!(!services.contains::<NpgsqlHealthCheck>());
    assert!(!services.contains::<SqlServerHealthCheck>());

    let options = services.resolve::<DbContextOptions<InventoryDbContext>>().unwrap();
    assert!(options.provider().is_in_memory());

    // The base settings still flow through
    assert_eq!(
        host.configuration().get::<String>("auth.issuer").unwrap(),
        "inventory-api"
    );
}

#[tokio::test]
async fn test_item_lifecycle_with_test_policy() {
    let host = host(true);
    let client = host.client();

    let created: Item = create_item(&client, "LAMP-01", 4)
        .await
        .assert_status(201)
        .json_as()
        .unwrap();
    assert_eq!(created.created_by.as_deref(), Some(TestingPolicyEvaluator::DEFAULT_SUBJECT));

    let listed: Vec<Item> = client.get("/api/items").send().await.unwrap().assert_ok().json_as().unwrap();
    assert_eq!(listed, vec![created.clone()]);

    let path = format!("/api/items/{}", created.id);
    client
        .get(&path)
        .send()
        .await
        .unwrap()
        .assert_ok()
        .assert_json_contains(json!({ "sku": "LAMP-01", "quantity": 4 }))
        .unwrap();

    client.delete(&path).send().await.unwrap().assert_status(204);
    client
        .get(&path)
        .send()
        .await
        .unwrap()
        .assert_status(404)
        .assert_error_code("RESOURCE_NOT_FOUND")
        .unwrap();
}

#[tokio::test]
async fn test_integration_settings_drive_validation() {
    let host = host(true);
    let client = host.client();

    create_item(&client, "BULK-01", 501)
        .await
        .assert_status(422)
        .assert_body_contains("500")
        .unwrap();
    create_item(&client, "BULK-02", 500).await.assert_status(201);
}

#[tokio::test]
async fn test_writes_fail_without_authentication_service() {
    let host = host(false);
    let client = host.client();

    create_item(&client, "LAMP-02", 1)
        .await
        .assert_status(500)
        .assert_error_code("SERVICE_RESOLUTION_FAILED")
        .unwrap();

    // Reads are anonymous
    client.get("/api/items").send().await.unwrap().assert_ok();
}

#[tokio::test]
async fn test_reintroduced_authentication_enforces_roles() {
    setup();
    let service = AuthenticationService::new(JwtSettings {
        issuer: "inventory-api".to_string(),
        audience: "inventory-clients".to_string(),
        signing_key: "integration-override-signing-key-0001".to_string(),
        token_lifetime_secs: 120,
    })
    .unwrap();
    let writer = service.issue_token("warehouse", &[INVENTORY_WRITER_ROLE]).unwrap();
    let auditor = service.issue_token("auditor", &["inventory-auditor"]).unwrap();

    let mut overrides = ServiceCollection::new();
    overrides.add_instance(Arc::new(service));
    let host = create_test_host::<InventoryApp>(overrides, false).unwrap();

    let anonymous = host.client();
    create_item(&anonymous, "SAFE-01", 1)
        .await
        .assert_status(401)
        .assert_error_code("UNAUTHORIZED_ACCESS")
        .unwrap();

    let auditor = host.client().bearer_token(&auditor);
    create_item(&auditor, "SAFE-01", 1).await.assert_status(403);

    let writer = host.client().bearer_token(&writer);
    let created: Item = create_item(&writer, "SAFE-01", 1)
        .await
        .assert_status(201)
        .json_as()
        .unwrap();
    assert_eq!(created.created_by.as_deref(), Some("warehouse"));
}

#[tokio::test]
async fn test_health_reports_no_database_checks() {
    let host = host(false);
    let report = host.client().get("/health").send().await.unwrap().assert_ok();
    let report = report.json().unwrap();

    assert_eq!(report["status"], "Healthy");
    assert_eq!(report["entries"], json!({}));
}

#[tokio::test]
async fn test_hosts_keep_separate_inventories() {
    let first = host(true);
    let second = host(true);

    let sku = utils::random_string(Some("SKU"));
    create_item(&first.client(), &sku, 1).await.assert_status(201);

    let listed: Vec<Item> = second.client().get("/api/items").send().await.unwrap().json_as().unwrap();
    assert!(listed.is_empty());
}
