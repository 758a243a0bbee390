//! gRPC transport for the order service.
//!
//! Uses tonic for the server and client and prost for message serialization
//! (standard protobuf wire format, no `.proto` file). The service stubs are
//! generated by `build.rs`.
//!
//! ## RPCs
//!
//! - `CreateOrder` - validate, persist, announce `order.created`.
//! - `GetOrder` - fetch one order.
//! - `UpdateOrderStatus` - overwrite the status, no transition check.

mod client;
pub mod messages;
mod server;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/fulfillment.order.OrderService.rs"));
}

pub use client::{OrderClient, StatusUpdater};
pub use generated::order_service_client::OrderServiceClient;
pub use generated::order_service_server::{
    OrderService as OrderServiceRpc, OrderServiceServer,
};
pub use server::{grpc_server, serve_grpc, OrderGrpcHandler};
