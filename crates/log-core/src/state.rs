use std::sync::Mutex;
use tokio::sync::watch;

/// A point-in-time view of the log's metadata (spec.md §3, §4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub first_index: u64,
    pub last_index: u64,
    pub bytes_used: u64,
    pub bytes_total: u64,
}

impl Snapshot {
    /// True for a fresh, empty log: `lastIndex = firstIndex - 1` (spec.md §3 I1-I2).
    pub fn is_empty(&self) -> bool {
        self.last_index + 1 == self.first_index
    }
}

struct Inner {
    first_index: u64,
    last_index: u64,
    bytes_used: u64,
    bytes_total: u64,
}

/// `LogState` is the single source of truth for the metadata triple
/// `(firstIndex, lastIndex, bytes*)` (spec.md §4.A). Reads and writes are
/// constant-time under a plain mutex; no I/O is ever performed while it is
/// held. Advancing `last_index` additionally publishes through a
/// `tokio::sync::watch` channel, giving every waiter an edge-broadcast
/// wakeup with no spurious loss (spec.md §4.A) and no per-waiter queue on
/// the commit path (spec.md §9, "commit notification as broadcast").
///
/// A second, opaque generation counter is bumped on *every* metadata
/// mutation, including `first_index` advancing on its own (plain Discard,
/// no fast-forward). `last_index_tx` alone cannot wake a tailing reader in
/// that case since `last_index` never moves; the Read Service's
/// mid-tail-truncation check (spec.md §4.D) watches the generation instead.
pub struct LogState {
    inner: Mutex<Inner>,
    last_index_tx: watch::Sender<u64>,
    generation_tx: watch::Sender<u64>,
}

impl LogState {
    /// Construct a fresh, empty log with the given approximate capacity.
    pub fn new(bytes_total: u64) -> Self {
        let (last_index_tx, _) = watch::channel(0);
        let (generation_tx, _) = watch::channel(0);
        Self {
            inner: Mutex::new(Inner {
                first_index: 1,
                last_index: 0,
                bytes_used: 0,
                bytes_total,
            }),
            last_index_tx,
            generation_tx,
        }
    }

    /// Restore a log's metadata after a restart (spec.md §6, "Persisted state").
    pub fn restore(first_index: u64, last_index: u64, bytes_used: u64, bytes_total: u64) -> Self {
        let (last_index_tx, _) = watch::channel(last_index);
        let (generation_tx, _) = watch::channel(0);
        Self {
            inner: Mutex::new(Inner {
                first_index,
                last_index,
                bytes_used,
                bytes_total,
            }),
            last_index_tx,
            generation_tx,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock().unwrap();
        Snapshot {
            first_index: inner.first_index,
            last_index: inner.last_index,
            bytes_used: inner.bytes_used,
            bytes_total: inner.bytes_total,
        }
    }

    /// Advance `lastIndex` to (at least) `new_last`, and wake every waiter
    /// whose threshold is now satisfied. No-op if `new_last` does not move
    /// the index forward, preserving I2 (non-decreasing).
    pub fn advance_last_index(&self, new_last: u64) {
        let mut inner = self.inner.lock().unwrap();
        if new_last > inner.last_index {
            inner.last_index = new_last;
            // `send` only notifies receivers if the value actually changed,
            // but we already guarded that above; the borrowed guard is
            // dropped before waiters wake since `send` doesn't await.
            let _ = self.last_index_tx.send(new_last);
            self.bump_generation();
        }
    }

    /// Advance `firstIndex` to (at least) `new_first`, preserving I1.
    /// Returns the effective new first index (a no-op leaves it unchanged).
    pub fn advance_first_index(&self, new_first: u64) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        if new_first > inner.first_index {
            inner.first_index = new_first;
            self.bump_generation();
        }
        inner.first_index
    }

    fn bump_generation(&self) {
        let next = *self.generation_tx.borrow() + 1;
        let _ = self.generation_tx.send(next);
    }

    /// Record a fresh capacity reading from the Storage Adapter.
    pub fn set_bytes(&self, bytes_used: u64, bytes_total: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.bytes_used = bytes_used;
        inner.bytes_total = bytes_total;
    }

    /// Suspend until `lastIndex >= threshold`, or return immediately if
    /// already satisfied. Dropping the returned future before it resolves
    /// releases the registration with no further bookkeeping (spec.md §4.D,
    /// "Cancellation").
    pub async fn wait_for_commit(&self, threshold: u64) -> u64 {
        let mut rx = self.last_index_tx.subscribe();
        if *rx.borrow() >= threshold {
            return *rx.borrow();
        }
        loop {
            if rx.changed().await.is_err() {
                // Sender dropped; this only happens if LogState itself was
                // dropped, so there is nothing left to wait on.
                return *rx.borrow();
            }
            let value = *rx.borrow();
            if value >= threshold {
                return value;
            }
        }
    }

    /// A receiver that is notified on *any* metadata mutation — commits or
    /// discards alike. Used by the Read Service's tail loop so it wakes
    /// both for new entries and for a prefix truncation racing past its
    /// cursor (spec.md §4.D).
    pub fn subscribe_generation(&self) -> watch::Receiver<u64> {
        self.generation_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    /// P3 (monotonicity): no matter what sequence of (possibly
    /// out-of-order, possibly backwards) values is thrown at
    /// `advance_last_index`/`advance_first_index`, the observed snapshot
    /// never moves backwards.
    #[quickcheck]
    fn indexes_are_monotonic_under_arbitrary_advances(
        last_advances: Vec<u64>,
        first_advances: Vec<u64>,
    ) -> bool {
        let state = LogState::new(1 << 20);
        let mut prev_last = 0;
        let mut prev_first = 1;
        for value in last_advances {
            state.advance_last_index(value);
            let snap = state.snapshot();
            if snap.last_index < prev_last {
                return false;
            }
            prev_last = snap.last_index;
        }
        for value in first_advances {
            state.advance_first_index(value);
            let snap = state.snapshot();
            if snap.first_index < prev_first {
                return false;
            }
            prev_first = snap.first_index;
        }
        true
    }

    #[test]
    fn fresh_log_is_empty() {
        let state = LogState::new(1024);
        let snap = state.snapshot();
        assert_eq!(snap.first_index, 1);
        assert_eq!(snap.last_index, 0);
        assert!(snap.is_empty());
    }

    #[tokio::test]
    async fn wait_for_commit_wakes_on_advance() {
        let state = std::sync::Arc::new(LogState::new(1024));
        let waiter = {
            let state = state.clone();
            tokio::spawn(async move { state.wait_for_commit(3).await })
        };

        tokio::task::yield_now().await;
        state.advance_last_index(1);
        state.advance_last_index(2);
        state.advance_last_index(3);

        let woke_at = waiter.await.unwrap();
        assert_eq!(woke_at, 3);
    }

    #[tokio::test]
    async fn wait_for_commit_already_satisfied_returns_immediately() {
        let state = LogState::new(1024);
        state.advance_last_index(5);
        let woke_at = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            state.wait_for_commit(5),
        )
        .await
        .expect("should not block");
        assert_eq!(woke_at, 5);
    }

    #[test]
    fn indexes_never_move_backwards() {
        let state = LogState::new(1024);
        state.advance_last_index(10);
        state.advance_last_index(3); // no-op
        assert_eq!(state.snapshot().last_index, 10);

        state.advance_first_index(5);
        state.advance_first_index(2); // no-op
        assert_eq!(state.snapshot().first_index, 5);
    }

    #[tokio::test]
    async fn generation_wakes_on_first_index_advance_alone() {
        let state = std::sync::Arc::new(LogState::new(1024));
        let mut generation = state.subscribe_generation();

        let waiter = tokio::spawn(async move {
            generation.changed().await.unwrap();
        });

        tokio::task::yield_now().await;
        // Advancing first_index alone (no last_index movement) must still
        // bump the generation, unlike last_index_tx.
        state.advance_first_index(2);

        tokio::time::timeout(std::time::Duration::from_millis(50), waiter)
            .await
            .expect("generation watcher should wake without a commit")
            .unwrap();
    }

    #[test]
    fn generation_does_not_bump_on_no_op_advance() {
        let state = LogState::new(1024);
        let generation = state.subscribe_generation();
        let before = *generation.borrow();
        state.advance_first_index(1); // already at 1, no-op
        state.advance_last_index(0); // already at 0, no-op
        assert_eq!(*generation.borrow(), before);
    }
}
