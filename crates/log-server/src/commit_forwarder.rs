use futures::StreamExt;
use log_core::{LogState, StorageAdapter};
use std::sync::Arc;
use tracing::debug;

/// Forward a [`StorageAdapter`]'s raw commit notifications into the single
/// authoritative [`LogState`], so every consumer — Read tailing, InfoStream
/// — observes progress through one commit-watch regardless of whether the
/// advance came from this server's own `propose` calls or from replication
/// (spec.md §2 data flow: "Storage Adapter commits and signals Log State").
///
/// Runs until the adapter's commit stream ends, which only happens when the
/// adapter itself is being torn down.
pub async fn forward_commits<A>(storage: Arc<A>, state: Arc<LogState>)
where
    A: StorageAdapter + 'static,
{
    let mut commits = storage.subscribe_commits();
    while let Some(advanced_to) = commits.next().await {
        state.advance_last_index(advanced_to);
    }
    debug!("commit forwarder exiting: adapter commit stream closed");
}
