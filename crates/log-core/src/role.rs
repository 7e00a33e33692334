use crate::storage::{Role, StorageAdapter};
use std::sync::Arc;

/// The categories of request the Role Controller polices (spec.md §4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Append,
    Discard,
    Read,
    /// `Info` with `allowStale = false`.
    InfoFresh,
}

impl OpKind {
    /// Whether this operation kind requires the local server to be
    /// authoritative (primary) to serve it. `Read` and stale `Info` can be
    /// served by any replica; everything that mutates the log, or that
    /// promises freshness, cannot.
    fn requires_primary(self) -> bool {
        match self {
            OpKind::Append | OpKind::Discard | OpKind::InfoFresh => true,
            OpKind::Read => false,
        }
    }
}

/// Outcome of a [`RoleController::can_serve`] check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeDecision {
    Serve,
    /// `host` is empty when the primary is unknown: clients are meant to
    /// fall back to service discovery rather than hot-retry (spec.md §9).
    Redirect { host: String },
}

/// Determines whether this server can serve a given request kind right
/// now, consulting the Storage Adapter's view of cluster role (spec.md
/// §4.G). This generalizes `gazette::Router`'s routing/caching idea turned
/// around: instead of picking a remote channel to dial, it decides whether
/// *this* server may answer, and otherwise names where to go.
pub struct RoleController<A: StorageAdapter + ?Sized> {
    adapter: Arc<A>,
}

impl<A: StorageAdapter + ?Sized> Clone for RoleController<A> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
        }
    }
}

impl<A: StorageAdapter + ?Sized> RoleController<A> {
    pub fn new(adapter: Arc<A>) -> Self {
        Self { adapter }
    }

    pub async fn can_serve(&self, op: OpKind) -> ServeDecision {
        if !op.requires_primary() {
            return ServeDecision::Serve;
        }

        let (role, primary_hint) = self.adapter.role().await;
        match role {
            Role::Primary => ServeDecision::Serve,
            Role::Follower | Role::Unknown => ServeDecision::Redirect { host: primary_hint },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::storage::Entry;
    use async_trait::async_trait;

    struct FixedRole(Role, &'static str);

    #[async_trait]
    impl StorageAdapter for FixedRole {
        async fn propose(&self, _batch: Vec<Vec<u8>>) -> Result<Vec<u64>> {
            unimplemented!()
        }
        async fn propose_skip_range(&self, _first: u64, _last: u64) -> Result<()> {
            unimplemented!()
        }
        async fn read_at(&self, _index: u64) -> Result<Entry> {
            unimplemented!()
        }
        async fn truncate_prefix(&self, _new_first_index: u64) -> Result<()> {
            unimplemented!()
        }
        async fn capacity_probe(&self) -> Result<(u64, u64)> {
            unimplemented!()
        }
        async fn role(&self) -> (Role, String) {
            (self.0, self.1.to_string())
        }
        fn subscribe_commits(&self) -> futures::stream::BoxStream<'static, u64> {
            Box::pin(futures::stream::empty())
        }
    }

    #[tokio::test]
    async fn reads_always_served() {
        let ctl = RoleController::new(Arc::new(FixedRole(Role::Follower, "")));
        assert_eq!(ctl.can_serve(OpKind::Read).await, ServeDecision::Serve);
    }

    #[tokio::test]
    async fn append_redirects_when_follower() {
        let ctl = RoleController::new(Arc::new(FixedRole(Role::Follower, "primary:1234")));
        assert_eq!(
            ctl.can_serve(OpKind::Append).await,
            ServeDecision::Redirect {
                host: "primary:1234".to_string()
            }
        );
    }

    #[tokio::test]
    async fn append_redirects_with_empty_host_when_unknown() {
        let ctl = RoleController::new(Arc::new(FixedRole(Role::Unknown, "")));
        assert_eq!(
            ctl.can_serve(OpKind::Discard).await,
            ServeDecision::Redirect {
                host: String::new()
            }
        );
    }

    #[tokio::test]
    async fn append_served_when_primary() {
        let ctl = RoleController::new(Arc::new(FixedRole(Role::Primary, "")));
        assert_eq!(ctl.can_serve(OpKind::InfoFresh).await, ServeDecision::Serve);
    }
}
