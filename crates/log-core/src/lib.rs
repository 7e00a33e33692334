//! Core log state machine: metadata bookkeeping, the storage adapter
//! contract, and the role/redirect controller (spec.md §4.A, §4.B, §4.G).
//! Deliberately independent of the gRPC wire types in `log-proto` — those
//! are bound to this crate's types by `log-server`.

pub mod error;
pub mod retry;
pub mod role;
pub mod state;
pub mod storage;

pub use error::{Error, Result};
pub use retry::retry_transient;
pub use role::{OpKind, RoleController, ServeDecision};
pub use state::{LogState, Snapshot};
pub use storage::{Entry, Role, StorageAdapter};
