use std::net::SocketAddr;

use inventory_api::InventoryApp;
use stagehand_core::Environment;
use stagehand_http::{init_logging, LoggingConfig, WebHostBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment: Environment = std::env::var("STAGEHAND_ENVIRONMENT")
        .ok()
        .map(|name| name.parse())
        .transpose()?
        .unwrap_or_default();

    let host = WebHostBuilder::<InventoryApp>::new()
        .use_environment(environment)
        .build()?;

    let logging = LoggingConfig::from_configuration(host.environment(), host.configuration())
        .with_service("inventory-api");
    init_logging(logging).map_err(|e| anyhow::anyhow!(e))?;

    let addr: SocketAddr = host
        .configuration()
        .get_or("server.address", "0.0.0.0:8080".to_string())
        .parse()?;

    host.serve(addr).await?;
    Ok(())
}
