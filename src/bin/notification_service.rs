//! Notifier: consumes `order.paid` and `order.failed`, records the outcome
//! through the order API and notifies the customer.

use std::sync::Arc;

use anyhow::Context;
use order_fulfillment::app;
use order_fulfillment::bus::NatsBus;
use order_fulfillment::config::NotificationConfig;
use order_fulfillment::notification::{LogSink, Notifier};
use order_fulfillment::rpc::OrderClient;
use order_fulfillment::telemetry;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let config = NotificationConfig::from_env().context("invalid configuration")?;
    let bus = NatsBus::connect(&config.nats.url, &config.nats.client_name).await?;
    let orders = OrderClient::connect_lazy(&config.order_service_host)?;
    let notifier = Notifier::new(Arc::new(orders), Arc::new(LogSink));

    let shutdown = CancellationToken::new();
    let workers =
        app::start_notification_service(&bus, notifier, config.handler_timeout, shutdown.clone())
            .await?;
    bus.flush().await?;
    tracing::info!("notification service ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    shutdown.cancel();

    app::stop_workers(workers).await;
    bus.flush().await?;
    Ok(())
}
