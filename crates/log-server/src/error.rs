/// Errors specific to the service layer: violations of the stream-level
/// protocol that the spec says must abort the stream with a transport
/// error rather than a protocol reply (spec.md §4.C, §7 "Protocol error").
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("append stream protocol violation: expected sequence {expected}, got {got}")]
    SequenceViolation { expected: u64, got: u64 },

    #[error("discard request {requested} cannot fast-forward: {reason}")]
    FastForwardRejected { requested: u64, reason: String },
}

impl From<ServiceError> for tonic::Status {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::SequenceViolation { .. } => tonic::Status::invalid_argument(err.to_string()),
            ServiceError::FastForwardRejected { .. } => tonic::Status::aborted(err.to_string()),
        }
    }
}
