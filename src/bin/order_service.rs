//! Order service: gRPC order API, publishes `order.created`.

use std::sync::Arc;

use anyhow::Context;
use order_fulfillment::app;
use order_fulfillment::bus::NatsBus;
use order_fulfillment::config::OrderServiceConfig;
use order_fulfillment::telemetry;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let config = OrderServiceConfig::from_env().context("invalid configuration")?;
    let bus = NatsBus::connect(&config.nats.url, &config.nats.client_name).await?;
    let store = app::open_store(&config.store).await?;

    let shutdown = CancellationToken::new();
    let running =
        app::start_order_service(store, Arc::new(bus.clone()), config.grpc_addr, shutdown.clone())
            .await?;
    tracing::info!(addr = %running.local_addr, "order service ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    shutdown.cancel();

    running.wait().await?;
    bus.flush().await?;
    Ok(())
}
