fn main() {
    // The wire messages are hand-written prost structs in `src/rpc/messages.rs`,
    // so the service stubs are generated without a `.proto` file.
    let service = tonic_build::manual::Service::builder()
        .name("OrderService")
        .package("fulfillment.order")
        .method(
            tonic_build::manual::Method::builder()
                .name("create_order")
                .route_name("CreateOrder")
                .input_type("crate::rpc::messages::CreateOrderRequest")
                .output_type("crate::rpc::messages::CreateOrderResponse")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .method(
            tonic_build::manual::Method::builder()
                .name("get_order")
                .route_name("GetOrder")
                .input_type("crate::rpc::messages::GetOrderRequest")
                .output_type("crate::rpc::messages::GetOrderResponse")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .method(
            tonic_build::manual::Method::builder()
                .name("update_order_status")
                .route_name("UpdateOrderStatus")
                .input_type("crate::rpc::messages::UpdateOrderStatusRequest")
                .output_type("crate::rpc::messages::UpdateOrderStatusResponse")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}
