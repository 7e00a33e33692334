//! In-memory [`StorageAdapter`] implementation. This stands in for the
//! external consensus/persistence backend spec.md declares out of scope:
//! it gives the server something to propose to and read from in tests and
//! in single-node deployments, the same way an in-memory loglet stands in
//! for a real replicated backend in comparable log-structured systems.
//!
//! None of this crate is durable across restarts; that is intentional, it
//! exists to exercise `log-core` and `log-server`, not to replace a real
//! storage engine.

use futures::stream::BoxStream;
use log_core::storage::{Entry, Role, StorageAdapter};
use log_core::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

struct Inner {
    first_index: u64,
    last_index: u64,
    entries: BTreeMap<u64, Entry>,
    bytes_used: u64,
}

/// An in-memory, single-process [`StorageAdapter`]. Defaults to reporting
/// itself as [`Role::Primary`]; use [`MemoryAdapter::set_role`] to simulate
/// a follower or an unknown-leader state for redirect-path tests (spec.md
/// S5).
pub struct MemoryAdapter {
    inner: Mutex<Inner>,
    commits: broadcast::Sender<u64>,
    bytes_total: u64,
    role: Mutex<(Role, String)>,
}

impl MemoryAdapter {
    pub fn new(bytes_total: u64) -> Self {
        let (commits, _) = broadcast::channel(1024);
        Self {
            inner: Mutex::new(Inner {
                first_index: 1,
                last_index: 0,
                entries: BTreeMap::new(),
                bytes_used: 0,
            }),
            commits,
            bytes_total,
            role: Mutex::new((Role::Primary, String::new())),
        }
    }

    pub fn set_role(&self, role: Role, primary_hint: impl Into<String>) {
        *self.role.lock().unwrap() = (role, primary_hint.into());
    }
}

#[async_trait::async_trait]
impl StorageAdapter for MemoryAdapter {
    async fn propose(&self, batch: Vec<Vec<u8>>) -> Result<Vec<u64>> {
        if batch.is_empty() {
            // An empty batch is a liveness probe at the service layer; the
            // adapter should never be invoked for one, but treat it as a
            // harmless no-op rather than asserting.
            return Ok(Vec::new());
        }

        let mut inner = self.inner.lock().unwrap();

        let added_bytes: u64 = batch.iter().map(|b| b.len() as u64).sum();
        if inner.bytes_used + added_bytes > self.bytes_total {
            return Err(Error::Full);
        }

        let mut indexes = Vec::with_capacity(batch.len());
        for data in batch {
            inner.last_index += 1;
            let index = inner.last_index;
            inner.bytes_used += data.len() as u64;
            inner.entries.insert(index, Entry::data(index, data));
            indexes.push(index);
        }

        let last = inner.last_index;
        drop(inner);
        let _ = self.commits.send(last);

        Ok(indexes)
    }

    async fn propose_skip_range(&self, first_index: u64, last_index: u64) -> Result<()> {
        if first_index > last_index {
            return Ok(());
        }

        let mut inner = self.inner.lock().unwrap();
        for index in first_index..=last_index {
            inner.entries.insert(index, Entry::skip(index));
        }
        if last_index > inner.last_index {
            inner.last_index = last_index;
        }

        let last = inner.last_index;
        drop(inner);
        let _ = self.commits.send(last);

        Ok(())
    }

    async fn read_at(&self, index: u64) -> Result<Entry> {
        let inner = self.inner.lock().unwrap();
        if index < inner.first_index {
            return Err(Error::Truncated(index));
        }
        if index > inner.last_index {
            return Err(Error::NotFound(index));
        }
        inner
            .entries
            .get(&index)
            .cloned()
            .ok_or(Error::NotFound(index))
    }

    async fn truncate_prefix(&self, new_first_index: u64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if new_first_index <= inner.first_index {
            return Ok(());
        }

        let retained = inner.entries.split_off(&new_first_index);
        inner.entries = retained;
        inner.first_index = new_first_index;
        inner.bytes_used = inner
            .entries
            .values()
            .map(|e| e.data.len() as u64)
            .sum();

        Ok(())
    }

    async fn capacity_probe(&self) -> Result<(u64, u64)> {
        let inner = self.inner.lock().unwrap();
        Ok((inner.bytes_used, self.bytes_total))
    }

    async fn role(&self) -> (Role, String) {
        self.role.lock().unwrap().clone()
    }

    fn subscribe_commits(&self) -> BoxStream<'static, u64> {
        let rx = self.commits.subscribe();
        Box::pin(BroadcastStream::new(rx).filter_map(|item| item.ok()))
    }
}
