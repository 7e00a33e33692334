//! `tonic` implementation of the `Log` gRPC service: binds `log-core`'s
//! state machine and storage contract to the wire types generated from
//! `log-proto`.

pub mod append;
pub mod auth;
pub mod commit_forwarder;
pub mod discard;
pub mod error;
pub mod info;
pub mod read;
pub mod service;

pub use append::DEFAULT_APPEND_HIGH_WATER_MARK;
pub use auth::Interceptor;
pub use service::LogService;
