mod common;

use log_proto::read_reply::Result as ReadResult;
use log_proto::{AppendRequest, DiscardRequest, ReadRequest};
use tokio_stream::StreamExt;

fn req(sequence: u64, proposals: Vec<Vec<u8>>) -> AppendRequest {
    AppendRequest {
        sequence,
        proposals,
    }
}

/// S1 continued — a Read from index 1 yields the three just-appended
/// entries in order, with their original bytes.
#[tokio::test]
async fn read_from_start_returns_appended_entries() {
    let mut server = common::spawn(1 << 20).await;

    let outbound = tokio_stream::iter(vec![req(
        1,
        vec![b"A".to_vec(), b"B".to_vec(), b"C".to_vec()],
    )]);
    let mut replies = server.client.append(outbound).await.unwrap().into_inner();
    replies.next().await.unwrap().unwrap();

    let mut read = server
        .client
        .read(ReadRequest { next_index: 1 })
        .await
        .unwrap()
        .into_inner();

    let reply = read.next().await.unwrap().unwrap();
    match reply.result.unwrap() {
        ReadResult::Ok(ok) => {
            let got: Vec<(u64, Vec<u8>)> = ok
                .entries
                .into_iter()
                .map(|e| (e.index, e.data))
                .collect();
            assert_eq!(
                got,
                vec![
                    (1, b"A".to_vec()),
                    (2, b"B".to_vec()),
                    (3, b"C".to_vec())
                ]
            );
        }
        other => panic!("unexpected reply: {other:?}"),
    }
}

/// S2 — a reader opened past the current tail blocks, then receives the
/// entry as soon as a concurrent Append commits it.
#[tokio::test]
async fn tailing_reader_receives_new_commit() {
    let mut server = common::spawn(1 << 20).await;

    let mut read_client = server.client.clone();
    let mut read = read_client
        .read(ReadRequest { next_index: 1 })
        .await
        .unwrap()
        .into_inner();

    // No entries yet: either the stream is pending or yields an empty
    // keepalive. Give the tailing loop a moment to register before we
    // append, to exercise the actual suspend/resume path.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let outbound = tokio_stream::iter(vec![req(1, vec![b"X".to_vec()])]);
    let mut replies = server.client.append(outbound).await.unwrap().into_inner();
    let reply = replies.next().await.unwrap().unwrap();
    assert!(matches!(
        reply.result.unwrap(),
        log_proto::append_reply::Result::Ok(_)
    ));

    let reply = tokio::time::timeout(std::time::Duration::from_secs(2), async {
        loop {
            match read.next().await.unwrap().unwrap().result.unwrap() {
                ReadResult::Ok(ok) if !ok.entries.is_empty() => return ok,
                ReadResult::Ok(_) => continue, // empty keepalive
                other => panic!("unexpected reply: {other:?}"),
            }
        }
    })
    .await
    .expect("reader should observe the new commit");

    assert_eq!(reply.entries.len(), 1);
    assert_eq!(reply.entries[0].index, 1);
    assert_eq!(reply.entries[0].data, b"X");
}

/// Read continuity (P5): a stream started at `k` emits strictly
/// consecutive indexes with no gaps or duplicates.
#[tokio::test]
async fn read_continuity_across_multiple_batches() {
    let mut server = common::spawn(1 << 20).await;

    for i in 0..3u64 {
        let outbound = tokio_stream::iter(vec![req(1, vec![format!("entry-{i}").into_bytes()])]);
        let mut replies = server.client.append(outbound).await.unwrap().into_inner();
        replies.next().await.unwrap().unwrap();
    }

    let mut read = server
        .client
        .read(ReadRequest { next_index: 1 })
        .await
        .unwrap()
        .into_inner();

    let mut seen = Vec::new();
    while seen.len() < 3 {
        match read.next().await.unwrap().unwrap().result.unwrap() {
            ReadResult::Ok(ok) => seen.extend(ok.entries.into_iter().map(|e| e.index)),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    assert_eq!(seen, vec![1, 2, 3]);
}

/// A request below firstIndex is immediately reported truncated, never
/// redirected.
#[tokio::test]
async fn read_below_first_index_is_truncated() {
    let mut server = common::spawn(1 << 20).await;

    let outbound = tokio_stream::iter(vec![req(1, vec![b"x".to_vec()])]);
    let mut replies = server.client.append(outbound).await.unwrap().into_inner();
    replies.next().await.unwrap().unwrap();

    server
        .client
        .discard(DiscardRequest { first_index: 2 })
        .await
        .unwrap();

    let mut read = server
        .client
        .read(ReadRequest { next_index: 1 })
        .await
        .unwrap()
        .into_inner();

    let reply = read.next().await.unwrap().unwrap();
    match reply.result.unwrap() {
        ReadResult::Truncated(truncated) => assert!(truncated),
        other => panic!("unexpected reply: {other:?}"),
    }
    assert!(read.next().await.is_none());
}

/// If firstIndex advances past a tailing reader's cursor mid-stream (a
/// Discard raced ahead), the reader is told truncated rather than left
/// hanging.
#[tokio::test]
async fn discard_mid_tail_reports_truncated() {
    let mut server = common::spawn(1 << 20).await;

    let outbound = tokio_stream::iter(vec![req(1, vec![b"a".to_vec(), b"b".to_vec()])]);
    let mut replies = server.client.append(outbound).await.unwrap().into_inner();
    replies.next().await.unwrap().unwrap();

    let mut read = server
        .client
        .read(ReadRequest { next_index: 1 })
        .await
        .unwrap()
        .into_inner();

    // Drain the two already-committed entries.
    let reply = read.next().await.unwrap().unwrap();
    match reply.result.unwrap() {
        ReadResult::Ok(ok) => assert_eq!(ok.entries.len(), 2),
        other => panic!("unexpected reply: {other:?}"),
    }

    // Now the reader is tailing past lastIndex == 2, with cursor == 3. A
    // fast-forward Discard to 5 jumps firstIndex past that cursor (3 < 5),
    // which is genuinely a truncation from the reader's point of view,
    // unlike a plain Discard(3) that would only catch firstIndex up to
    // where the reader already was.
    server
        .client
        .discard(DiscardRequest { first_index: 5 })
        .await
        .unwrap();

    let reply = tokio::time::timeout(std::time::Duration::from_secs(2), read.next())
        .await
        .expect("reader should be woken by the discard")
        .unwrap()
        .unwrap();
    match reply.result.unwrap() {
        ReadResult::Truncated(truncated) => assert!(truncated),
        other => panic!("unexpected reply: {other:?}"),
    }
}
