//! gRPC surface of the hub connection
//!
//! The shuttle is a pure client: it opens one streaming subscription for
//! live replication and issues paged unary calls during reconciliation.

#[allow(clippy::all)]
#[allow(clippy::pedantic)]
pub mod proto {
    tonic::include_proto!("hub.v1");
}

mod client;

pub use client::HubClient;
