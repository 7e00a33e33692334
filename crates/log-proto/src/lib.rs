//! Message and gRPC service types for the `Log` service, compiled from
//! `proto/log.proto` by `build.rs`.
//!
//! Field tag numbers and RPC shapes here are part of the wire contract
//! (spec.md §6, "Wire compatibility") and must not change without a
//! compatibility plan, since third-party clients depend on them directly.

tonic::include_proto!("log.v1");

mod helpers;
