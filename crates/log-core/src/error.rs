/// Errors surfaced by [`crate::storage::StorageAdapter`] implementations and
/// by the log state machine itself. The service layer (`log-server`) maps
/// these onto the protocol-level replies of spec.md §7: `Full` and
/// `NotPrimary` become terminal RPC replies, `Unavailable` and `Io` are
/// retried a bounded number of times before being surfaced as a transport
/// error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("log is full")]
    Full,

    #[error("not the primary; leader hint: {leader_hint:?}")]
    NotPrimary { leader_hint: Option<String> },

    #[error("index {0} has been truncated")]
    Truncated(u64),

    #[error("index {0} not found")]
    NotFound(u64),

    #[error("storage adapter temporarily unavailable")]
    Unavailable,

    #[error("fast-forward discard to {requested} rejected by storage adapter: {reason}")]
    FastForwardRejected { requested: u64, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for tonic::Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Full | Error::NotPrimary { .. } | Error::Truncated(_) => {
                // These are first-class protocol replies (spec.md §7) and are
                // translated by the service layer before reaching a client;
                // reaching here means a caller used the adapter outside of
                // that layer. Map conservatively to distinct gRPC codes.
                tonic::Status::failed_precondition(err.to_string())
            }
            Error::NotFound(_) => tonic::Status::not_found(err.to_string()),
            Error::Unavailable => tonic::Status::unavailable(err.to_string()),
            Error::FastForwardRejected { .. } => tonic::Status::aborted(err.to_string()),
            Error::Io(err) => tonic::Status::internal(err.to_string()),
        }
    }
}
