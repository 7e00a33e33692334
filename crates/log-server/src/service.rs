use crate::{append, commit_forwarder, discard, info, read};
use futures::stream::BoxStream;
use futures::StreamExt;
use log_core::{LogState, RoleController, StorageAdapter};
use log_proto::log_server::Log;
use log_proto::{
    AppendReply, AppendRequest, DiscardReply, DiscardRequest, InfoReply, InfoRequest, ReadReply,
    ReadRequest,
};
use std::sync::Arc;
use tonic::{Request, Response, Status, Streaming};

/// Ties together the pieces SPEC_FULL §4 assigns to one server process: one
/// [`LogState`], one [`StorageAdapter`], and the [`RoleController`] that
/// mediates access to both. Implements the tonic-generated `Log` trait by
/// delegating each RPC to its dedicated module.
pub struct LogService<A: StorageAdapter> {
    storage: Arc<A>,
    state: Arc<LogState>,
    role: RoleController<A>,
    append_high_water_mark: usize,
}

impl<A: StorageAdapter + 'static> LogService<A> {
    pub fn new(storage: Arc<A>, state: Arc<LogState>) -> Self {
        Self {
            role: RoleController::new(storage.clone()),
            storage,
            state,
            append_high_water_mark: append::DEFAULT_APPEND_HIGH_WATER_MARK,
        }
    }

    pub fn with_high_water_mark(mut self, high_water_mark: usize) -> Self {
        self.append_high_water_mark = high_water_mark;
        self
    }

    /// Spawn the background task that forwards the Storage Adapter's raw
    /// commit stream into this service's `LogState`. Must be spawned once
    /// per process alongside the service.
    pub fn spawn_commit_forwarder(&self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(commit_forwarder::forward_commits(
            self.storage.clone(),
            self.state.clone(),
        ))
    }
}

#[tonic::async_trait]
impl<A: StorageAdapter + 'static> Log for LogService<A> {
    type AppendStream = BoxStream<'static, Result<AppendReply, Status>>;
    type ReadStream = BoxStream<'static, Result<ReadReply, Status>>;
    type InfoStreamStream = BoxStream<'static, Result<InfoReply, Status>>;

    async fn append(
        &self,
        request: Request<Streaming<AppendRequest>>,
    ) -> Result<Response<Self::AppendStream>, Status> {
        let requests = request.into_inner();
        let stream = append::append_stream(
            self.storage.clone(),
            requests,
            self.append_high_water_mark,
        );
        Ok(Response::new(stream.boxed()))
    }

    async fn discard(
        &self,
        request: Request<DiscardRequest>,
    ) -> Result<Response<DiscardReply>, Status> {
        let reply = discard::discard(
            &self.storage,
            &self.state,
            &self.role,
            request.into_inner().first_index,
        )
        .await?;
        Ok(Response::new(reply))
    }

    async fn read(
        &self,
        request: Request<ReadRequest>,
    ) -> Result<Response<Self::ReadStream>, Status> {
        let next_index = request.into_inner().next_index;
        let stream = read::read_stream(self.storage.clone(), self.state.clone(), next_index);
        Ok(Response::new(stream.boxed()))
    }

    async fn info(&self, request: Request<InfoRequest>) -> Result<Response<InfoReply>, Status> {
        let reply = info::info(
            &self.storage,
            &self.state,
            &self.role,
            request.into_inner().allow_stale,
        )
        .await?;
        Ok(Response::new(reply))
    }

    async fn info_stream(
        &self,
        request: Request<InfoRequest>,
    ) -> Result<Response<Self::InfoStreamStream>, Status> {
        let allow_stale = request.into_inner().allow_stale;
        let stream = info::info_stream(self.storage.clone(), self.state.clone(), allow_stale);
        Ok(Response::new(stream.boxed()))
    }
}
