use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// The atomic unit of the log (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub index: u64,
    pub skip: bool,
    pub data: Vec<u8>,
}

impl Entry {
    pub fn skip(index: u64) -> Self {
        Entry {
            index,
            skip: true,
            data: Vec::new(),
        }
    }

    pub fn data(index: u64, data: Vec<u8>) -> Self {
        Entry {
            index,
            skip: false,
            data,
        }
    }
}

/// Which role the underlying consensus/replication layer currently assigns
/// this server (spec.md §4.B `Role()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Follower,
    Unknown,
}

/// `StorageAdapter` is the narrow interface the core requires of the
/// external consensus/persistence backend (spec.md §4.B, §1 "Out of
/// scope"). The core makes no assumptions beyond this contract: how
/// proposals are replicated, how entries are encoded on disk, and how
/// `role()` is determined are all delegated.
///
/// Implementations must be `Send + Sync`: the server dispatches concurrent
/// RPCs onto independent tasks (spec.md §5) that all share one adapter.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Submit a batch of opaque proposals; resolves only once the batch is
    /// durably committed. Returned indexes correspond positionally to the
    /// input and must be dense from the adapter's point of view — any gap
    /// the underlying replication layer introduces is the adapter's
    /// responsibility to fill with skip entries before reporting success.
    async fn propose(&self, batch: Vec<Vec<u8>>) -> Result<Vec<u64>>;

    /// Propose a contiguous run of skip entries covering
    /// `[first_index, last_index]` inclusive, used by Discard's
    /// fast-forward path (spec.md §4.E). Implementation-defined; adapters
    /// that cannot synthesize skip entries should return
    /// `Error::FastForwardRejected`.
    async fn propose_skip_range(&self, first_index: u64, last_index: u64) -> Result<()>;

    /// Durable point read. Must return `Error::Truncated` if `index` is
    /// below the adapter's current first index, and `Error::NotFound` if it
    /// is above the adapter's current last index.
    async fn read_at(&self, index: u64) -> Result<Entry>;

    /// Advisory prefix truncation; the adapter may reclaim space at any
    /// later time; `bytesUsed` must eventually reflect it.
    async fn truncate_prefix(&self, new_first_index: u64) -> Result<()>;

    /// Current approximate `(bytesUsed, bytesTotal)`.
    async fn capacity_probe(&self) -> Result<(u64, u64)>;

    /// This adapter's current role, plus a hint of the current primary's
    /// host string (may be empty if unknown).
    async fn role(&self) -> (Role, String);

    /// A stream of "lastIndex advanced to L" events, driven by commits from
    /// any source (this server's own `propose` calls, or replication from
    /// elsewhere). `log-server` forwards this into `LogState`'s commit-watch
    /// so the Read/InfoStream services observe a single, authoritative
    /// notion of progress regardless of which path produced it.
    fn subscribe_commits(&self) -> futures::stream::BoxStream<'static, u64>;
}

impl fmt::Debug for dyn StorageAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn StorageAdapter")
    }
}
