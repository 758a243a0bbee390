//! Order service client and the status-update capability consumers depend on.

use std::sync::Arc;

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};

use super::messages::{
    required_order, CreateOrderRequest, GetOrderRequest, UpdateOrderStatusRequest,
};
use super::OrderServiceClient;
use crate::order::{NewOrder, Order, OrderError, OrderService, OrderStatus};

/// The one operation billing and notification need from the order store.
#[async_trait]
pub trait StatusUpdater: Send + Sync {
    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order, OrderError>;
}

#[async_trait]
impl<U: StatusUpdater + ?Sized> StatusUpdater for Arc<U> {
    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        (**self).update_order_status(order_id, status).await
    }
}

/// In-process updates, for single-binary deployments and tests.
#[async_trait]
impl StatusUpdater for OrderService {
    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        self.update_status(order_id, status).await
    }
}

impl From<Status> for OrderError {
    fn from(status: Status) -> Self {
        match status.code() {
            Code::InvalidArgument => OrderError::InvalidArgument(status.message().to_string()),
            Code::NotFound => OrderError::NotFound(status.message().to_string()),
            Code::Internal => OrderError::Internal(status.message().to_string()),
            code => OrderError::Internal(format!("{:?}: {}", code, status.message())),
        }
    }
}

/// gRPC client for the order service.
///
/// Cheap to clone; clones share one HTTP/2 channel.
#[derive(Clone, Debug)]
pub struct OrderClient {
    inner: OrderServiceClient<Channel>,
}

fn endpoint(host: &str) -> Result<Endpoint, OrderError> {
    let uri = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    Endpoint::from_shared(uri).map_err(|e| {
        OrderError::Internal(format!("invalid order service address {}: {}", host, e))
    })
}

impl OrderClient {
    /// Connect now, failing if the order service is unreachable.
    ///
    /// `host` is `host:port` or a full `http://host:port` URI.
    pub async fn connect(host: &str) -> Result<Self, OrderError> {
        let channel = endpoint(host)?
            .connect()
            .await
            .map_err(|e| OrderError::Internal(format!("connect to {}: {}", host, e)))?;
        Ok(Self::from_channel(channel))
    }

    /// Build a client that connects on first use. Must be called inside a
    /// Tokio runtime.
    pub fn connect_lazy(host: &str) -> Result<Self, OrderError> {
        Ok(Self::from_channel(endpoint(host)?.connect_lazy()))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: OrderServiceClient::new(channel),
        }
    }

    pub async fn create_order(&self, request: NewOrder) -> Result<Order, OrderError> {
        let response = self
            .inner
            .clone()
            .create_order(CreateOrderRequest {
                user_id: request.user_id,
                items: request.items.into_iter().map(Into::into).collect(),
            })
            .await?;
        required_order(response.into_inner().order)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
        let response = self
            .inner
            .clone()
            .get_order(GetOrderRequest {
                order_id: order_id.to_string(),
            })
            .await?;
        required_order(response.into_inner().order)
    }
}

#[async_trait]
impl StatusUpdater for OrderClient {
    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let response = self
            .inner
            .clone()
            .update_order_status(UpdateOrderStatusRequest {
                order_id: order_id.to_string(),
                status: status.as_wire(),
            })
            .await?;
        required_order(response.into_inner().order)
    }
}
