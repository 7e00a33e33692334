use futures::stream::Stream;
use log_core::{LogState, StorageAdapter};
use log_proto::ReadReply;
use std::sync::Arc;

fn to_proto_entry(entry: log_core::Entry) -> log_proto::Entry {
    log_proto::Entry {
        index: entry.index,
        skip: entry.skip,
        data: entry.data,
    }
}

/// Drive a single Read stream starting at `next_index` (spec.md §4.D).
/// Catches up by reading committed entries, then transitions to tailing by
/// suspending on `LogState`'s generation watch — no artificial delay is
/// introduced to accumulate a larger batch, but every currently-available
/// entry is read before flushing (spec.md §4.D). The generation watch (as
/// opposed to the plain commit-watch) is what lets this loop notice a
/// Discard that truncates past `cursor` without any new entry ever
/// committing. Each point read is wrapped in [`log_core::retry_transient`],
/// so a transient `Unavailable`/`Io` from the adapter is retried with
/// bounded backoff before this loop gives up and surfaces it as a
/// transport error.
pub fn read_stream<A>(
    storage: Arc<A>,
    state: Arc<LogState>,
    mut cursor: u64,
) -> impl Stream<Item = Result<ReadReply, tonic::Status>> + Send + 'static
where
    A: StorageAdapter + 'static,
{
    coroutines::try_coroutine(move |mut co| async move {
        let mut generation = state.subscribe_generation();
        loop {
            let snapshot = state.snapshot();
            if cursor < snapshot.first_index {
                () = co.yield_(Ok(ReadReply::truncated())).await;
                return Ok(());
            }

            let mut entries = Vec::new();
            let mut truncated_mid_batch = false;
            if cursor <= snapshot.last_index {
                for index in cursor..=snapshot.last_index {
                    let read = log_core::retry_transient(|| storage.read_at(index)).await;
                    match read {
                        Ok(entry) => entries.push(to_proto_entry(entry)),
                        Err(log_core::Error::Truncated(_)) => {
                            // A concurrent Discard raced ahead of us mid-batch.
                            truncated_mid_batch = true;
                            break;
                        }
                        Err(other) => return Err(other.into()),
                    }
                }
            }

            if !entries.is_empty() {
                cursor += entries.len() as u64;
                () = co.yield_(Ok(ReadReply::ok(entries))).await;
                continue;
            }

            if truncated_mid_batch {
                () = co.yield_(Ok(ReadReply::truncated())).await;
                return Ok(());
            }

            // Caught up: suspend until the log's bounds change at all (a
            // new commit, or a Discard moving first_index), then re-check
            // both conditions from the top.
            if generation.changed().await.is_err() {
                return Ok(());
            }
        }
    })
}
