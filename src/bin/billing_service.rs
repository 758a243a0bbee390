//! Payment simulator: consumes `order.created`, publishes the outcome and
//! records it through the order API.

use std::sync::Arc;

use anyhow::Context;
use order_fulfillment::app;
use order_fulfillment::billing::{PaymentDecider, PaymentProcessor};
use order_fulfillment::bus::NatsBus;
use order_fulfillment::config::BillingConfig;
use order_fulfillment::rpc::OrderClient;
use order_fulfillment::telemetry;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let config = BillingConfig::from_env().context("invalid configuration")?;
    let bus = NatsBus::connect(&config.nats.url, &config.nats.client_name).await?;
    let orders = OrderClient::connect_lazy(&config.order_service_host)?;

    let decider = PaymentDecider::new(config.success_rate);
    tracing::info!(
        success_rate = decider.success_rate(),
        order_service = %config.order_service_host,
        "billing service starting"
    );
    let processor = PaymentProcessor::new(Arc::new(bus.clone()), Arc::new(orders), decider)
        .with_latency(config.latency);

    let shutdown = CancellationToken::new();
    let worker =
        app::start_billing_service(&bus, processor, config.handler_timeout, shutdown.clone())
            .await?;
    bus.flush().await?;
    tracing::info!("billing service ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    shutdown.cancel();

    app::stop_workers(vec![worker]).await;
    bus.flush().await?;
    Ok(())
}
