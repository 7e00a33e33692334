use crate::error::ServiceError;
use futures::stream::{FuturesOrdered, Stream, StreamExt};
use log_core::{Error, OpKind, RoleController, ServeDecision, StorageAdapter};
use log_proto::{AppendReply, AppendRequest};
use std::sync::Arc;

/// Default high-water mark of in-flight proposals per Append stream before
/// the server stops reading further requests (spec.md §5 "Resource caps";
/// spec.md §9 notes this knob is a tuning choice the protocol doesn't fix).
pub const DEFAULT_APPEND_HIGH_WATER_MARK: usize = 64;

type ProposeOutcome = (u64, log_core::Result<Vec<u64>>);
type ProposeFuture = futures::future::BoxFuture<'static, ProposeOutcome>;

/// Drive a single Append bidi stream (spec.md §4.C). Replies are emitted in
/// request order (FIFO) via [`FuturesOrdered`], which preserves submission
/// order regardless of which proposal's `propose` call finishes first —
/// this is what lets the server pipeline multiple in-flight proposals
/// without ever reordering replies. Backpressure is simply "stop polling
/// the request stream while `inflight.len() >= high_water_mark`"; the
/// transport's own flow control does the rest. A non-probe `propose` call
/// is wrapped in [`log_core::retry_transient`], so a transient
/// `Unavailable`/`Io` from the adapter is retried with bounded backoff
/// before it surfaces as a transport error.
pub fn append_stream<A>(
    storage: Arc<A>,
    mut requests: tonic::Streaming<AppendRequest>,
    high_water_mark: usize,
) -> impl Stream<Item = Result<AppendReply, tonic::Status>> + Send + 'static
where
    A: StorageAdapter + 'static,
{
    let role = RoleController::new(storage.clone());

    coroutines::try_coroutine(move |mut co| async move {
        let mut expected_sequence: u64 = 1;
        let mut inflight: FuturesOrdered<ProposeFuture> = FuturesOrdered::new();
        let mut requests_done = false;

        loop {
            if requests_done && inflight.is_empty() {
                return Ok(());
            }

            tokio::select! {
                biased;

                Some((sequence, outcome)) = inflight.next(), if !inflight.is_empty() => {
                    match outcome {
                        Ok(indexes) => {
                            () = co.yield_(Ok(AppendReply::ok(sequence, indexes))).await;
                        }
                        Err(log_core::Error::Full) => {
                            () = co.yield_(Ok(AppendReply::full())).await;
                            return Ok(());
                        }
                        Err(log_core::Error::NotPrimary { leader_hint }) => {
                            () = co.yield_(Ok(AppendReply::redirect(leader_hint.unwrap_or_default()))).await;
                            return Ok(());
                        }
                        Err(other) => return Err(other.into()),
                    }
                }

                next = requests.next(), if !requests_done && inflight.len() < high_water_mark => {
                    match next {
                        None => requests_done = true,
                        Some(Err(status)) => return Err(status),
                        Some(Ok(request)) => {
                            if request.sequence != expected_sequence {
                                return Err(ServiceError::SequenceViolation {
                                    expected: expected_sequence,
                                    got: request.sequence,
                                }
                                .into());
                            }
                            expected_sequence += 1;

                            let sequence = request.sequence;
                            let fut: ProposeFuture = if request.proposals.is_empty() {
                                // An empty batch is a liveness/capacity probe;
                                // answer it without touching the adapter or
                                // role (a probe must succeed on any replica).
                                Box::pin(async move { (sequence, Ok(Vec::new())) })
                            } else {
                                let storage = storage.clone();
                                let role = role.clone();
                                Box::pin(async move {
                                    match role.can_serve(OpKind::Append).await {
                                        ServeDecision::Redirect { host } => (
                                            sequence,
                                            Err(Error::NotPrimary {
                                                leader_hint: (!host.is_empty()).then_some(host),
                                            }),
                                        ),
                                        ServeDecision::Serve => {
                                            let proposals = request.proposals;
                                            let outcome = log_core::retry_transient(|| {
                                                storage.propose(proposals.clone())
                                            })
                                            .await;
                                            (sequence, outcome)
                                        }
                                    }
                                })
                            };
                            inflight.push_back(fut);
                        }
                    }
                }
            }
        }
    })
}

// `tonic::Streaming` can only be constructed from a live connection, so the
// sequencing, backpressure, full/redirect, and protocol-error behavior of
// `append_stream` is covered end-to-end in `log-server/tests/append.rs`
// against a real in-process server and client.
