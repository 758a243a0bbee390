//! gRPC server for the order service.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use order_fulfillment::{rpc, InMemoryBus, InMemoryOrderStore, OrderService};
//!
//! let service = Arc::new(OrderService::new(
//!     Arc::new(InMemoryOrderStore::new()),
//!     Arc::new(InMemoryBus::new()),
//! ));
//!
//! // Get the server to compose with other tonic routes
//! let grpc_svc = rpc::grpc_server(service.clone());
//!
//! // Or serve directly on a bound listener
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:50051").await?;
//! rpc::serve_grpc(service, listener, shutdown).await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};

use super::messages::{
    CreateOrderRequest, CreateOrderResponse, GetOrderRequest, GetOrderResponse,
    UpdateOrderStatusRequest, UpdateOrderStatusResponse,
};
use super::{OrderServiceRpc, OrderServiceServer};
use crate::order::{OrderError, OrderService, OrderStatus};

impl From<OrderError> for Status {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidArgument(msg) => Status::invalid_argument(msg),
            OrderError::NotFound(msg) => Status::not_found(msg),
            OrderError::Internal(msg) => Status::internal(msg),
        }
    }
}

/// gRPC handler that wraps an `OrderService` and implements the generated
/// service trait.
pub struct OrderGrpcHandler {
    service: Arc<OrderService>,
}

impl OrderGrpcHandler {
    pub fn new(service: Arc<OrderService>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl OrderServiceRpc for OrderGrpcHandler {
    async fn create_order(
        &self,
        request: Request<CreateOrderRequest>,
    ) -> Result<Response<CreateOrderResponse>, Status> {
        let order = self
            .service
            .create_order(request.into_inner().into())
            .await?;

        Ok(Response::new(CreateOrderResponse {
            order: Some(order.into()),
        }))
    }

    async fn get_order(
        &self,
        request: Request<GetOrderRequest>,
    ) -> Result<Response<GetOrderResponse>, Status> {
        let order = self.service.get_order(&request.into_inner().order_id).await?;

        Ok(Response::new(GetOrderResponse {
            order: Some(order.into()),
        }))
    }

    async fn update_order_status(
        &self,
        request: Request<UpdateOrderStatusRequest>,
    ) -> Result<Response<UpdateOrderStatusResponse>, Status> {
        let req = request.into_inner();
        if req.order_id.is_empty() {
            return Err(Status::invalid_argument("order_id is required"));
        }
        // Unknown ordinals never reach the service.
        let status = OrderStatus::from_wire(req.status).ok_or_else(|| {
            Status::invalid_argument(format!("unsupported status {}", req.status))
        })?;
        let order = self.service.update_status(&req.order_id, status).await?;

        Ok(Response::new(UpdateOrderStatusResponse {
            order: Some(order.into()),
        }))
    }
}

/// Create an `OrderServiceServer` from a shared `OrderService`.
pub fn grpc_server(service: Arc<OrderService>) -> OrderServiceServer<OrderGrpcHandler> {
    OrderServiceServer::new(OrderGrpcHandler::new(service))
}

/// Serve the gRPC transport on an already bound listener until `shutdown`
/// resolves. Binding first lets callers learn the port before serving.
pub async fn serve_grpc<F>(
    service: Arc<OrderService>,
    listener: TcpListener,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    F: Future<Output = ()>,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "order gRPC server listening");
    }
    tonic::transport::Server::builder()
        .add_service(grpc_server(service))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
}
