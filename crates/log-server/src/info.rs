use futures::stream::Stream;
use log_core::{LogState, OpKind, RoleController, ServeDecision, StorageAdapter};
use log_proto::InfoReply;
use std::sync::Arc;
use std::time::Duration;

/// Execute a single Info request (spec.md §4.F). `allow_stale = false`
/// requires this server to be authoritative; a stale read is always
/// servable from the locally cached snapshot.
pub async fn info<A>(
    storage: &Arc<A>,
    state: &LogState,
    role: &RoleController<A>,
    allow_stale: bool,
) -> Result<InfoReply, tonic::Status>
where
    A: StorageAdapter,
{
    if !allow_stale {
        match role.can_serve(OpKind::InfoFresh).await {
            ServeDecision::Redirect { host } => return Ok(InfoReply::redirect(host)),
            ServeDecision::Serve => {}
        }
    }

    if let Ok((bytes_used, bytes_total)) = storage.capacity_probe().await {
        state.set_bytes(bytes_used, bytes_total);
    }

    let snapshot = state.snapshot();
    Ok(InfoReply::ok(
        snapshot.first_index,
        snapshot.last_index,
        snapshot.bytes_used,
        snapshot.bytes_total,
    ))
}

/// How long InfoStream coalesces rapid successive changes before pushing an
/// update, bounding update frequency without ever suppressing the eventual
/// push the spec requires (spec.md §4.F, "may coalesce... must eventually
/// converge").
const COALESCE_WINDOW: Duration = Duration::from_millis(50);

/// Drive an InfoStream subscription: push a fresh snapshot every time any
/// of the four fields materially changes, coalescing bursts within
/// [`COALESCE_WINDOW`]. Watches the generation channel rather than
/// `last_index` alone — a plain Discard advances `first_index` (and lowers
/// `bytes_used`) without ever moving `last_index`, and the generation
/// channel is what notices that (`read::read_stream` watches the same
/// channel for the analogous reason).
pub fn info_stream<A>(
    storage: Arc<A>,
    state: Arc<LogState>,
    allow_stale: bool,
) -> impl Stream<Item = Result<InfoReply, tonic::Status>> + Send + 'static
where
    A: StorageAdapter + 'static,
{
    coroutines::try_coroutine(move |mut co| async move {
        let role = RoleController::new(storage.clone());
        let mut generation = state.subscribe_generation();
        let mut last_sent: Option<(u64, u64, u64, u64)> = None;

        loop {
            if !allow_stale {
                if let ServeDecision::Redirect { host } = role.can_serve(OpKind::InfoFresh).await {
                    () = co.yield_(Ok(InfoReply::redirect(host))).await;
                    return Ok(());
                }
            }

            if let Ok((bytes_used, bytes_total)) = storage.capacity_probe().await {
                state.set_bytes(bytes_used, bytes_total);
            }
            let snapshot = state.snapshot();
            let current = (
                snapshot.first_index,
                snapshot.last_index,
                snapshot.bytes_used,
                snapshot.bytes_total,
            );
            if last_sent != Some(current) {
                last_sent = Some(current);
                () = co
                    .yield_(Ok(InfoReply::ok(
                        snapshot.first_index,
                        snapshot.last_index,
                        snapshot.bytes_used,
                        snapshot.bytes_total,
                    )))
                    .await;
            }

            if generation.changed().await.is_err() {
                return Ok(());
            }
            // Give a short window for further commits/discards to land so a
            // burst coalesces into one push instead of one per commit.
            tokio::time::sleep(COALESCE_WINDOW).await;
        }
    })
}
