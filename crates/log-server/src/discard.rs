use crate::error::ServiceError;
use log_core::{LogState, OpKind, RoleController, ServeDecision, StorageAdapter};
use log_proto::DiscardReply;
use std::sync::Arc;

/// Execute a single Discard request (spec.md §4.E). Unary, so no coroutine
/// is needed: the whole operation either completes or the RPC fails.
pub async fn discard<A>(
    storage: &Arc<A>,
    state: &LogState,
    role: &RoleController<A>,
    requested_first_index: u64,
) -> Result<DiscardReply, tonic::Status>
where
    A: StorageAdapter,
{
    match role.can_serve(OpKind::Discard).await {
        ServeDecision::Redirect { host } => return Ok(DiscardReply::redirect(host)),
        ServeDecision::Serve => {}
    }

    let snapshot = state.snapshot();

    if requested_first_index <= snapshot.first_index {
        return Ok(DiscardReply::ok());
    }

    if requested_first_index > snapshot.last_index + 1 {
        storage
            .propose_skip_range(snapshot.last_index + 1, requested_first_index - 1)
            .await
            .map_err(|err| match err {
                log_core::Error::FastForwardRejected { requested, reason } => {
                    ServiceError::FastForwardRejected { requested, reason }.into()
                }
                other => tonic::Status::from(other),
            })?;
        state.advance_last_index(requested_first_index - 1);
    }

    storage.truncate_prefix(requested_first_index).await?;
    state.advance_first_index(requested_first_index);

    if let Ok((bytes_used, bytes_total)) = storage.capacity_probe().await {
        state.set_bytes(bytes_used, bytes_total);
    }

    Ok(DiscardReply::ok())
}
