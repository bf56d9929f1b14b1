//! # Service Protos
//!
//! Generated gRPC bindings for the remote store.
//! `store.v1` holds the `StoreService` and its request/response messages,
//! `ubo.v1` the application actions and events they carry.

pub mod ubo {
    pub mod v1 {
        tonic::include_proto!("ubo.v1");
    }
}

pub mod store {
    pub mod v1 {
        tonic::include_proto!("store.v1");
    }
}

// Re-export common types for convenience
pub use store::v1::store_service_client::StoreServiceClient;
pub use store::v1::store_service_server::{StoreService, StoreServiceServer};
pub use store::v1::{
    DispatchActionRequest, DispatchActionResponse, DispatchEventRequest, DispatchEventResponse,
    SubscribeEventRequest, SubscribeEventResponse,
};
pub use ubo::v1::{Action, Event, Key};
