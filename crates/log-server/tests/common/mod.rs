use log_core::LogState;
use log_memstore::MemoryAdapter;
use log_proto::log_client::LogClient;
use log_proto::log_server::LogServer;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Channel, Server};

/// An in-process `Log` service bound to an ephemeral loopback port, with a
/// connected client. Dropping this tears down the server task and the
/// commit forwarder.
pub struct TestServer {
    pub client: LogClient<Channel>,
    pub storage: Arc<MemoryAdapter>,
    pub state: Arc<LogState>,
    _server: tokio::task::JoinHandle<()>,
    _forwarder: tokio::task::JoinHandle<()>,
}

pub async fn spawn(bytes_total: u64) -> TestServer {
    spawn_with(Arc::new(MemoryAdapter::new(bytes_total)), bytes_total).await
}

pub async fn spawn_with(storage: Arc<MemoryAdapter>, bytes_total: u64) -> TestServer {
    let state = Arc::new(LogState::new(bytes_total));

    let service = log_server::LogService::new(storage.clone(), state.clone());
    let forwarder = service.spawn_commit_forwarder();

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");

    let server = tokio::spawn(async move {
        Server::builder()
            .add_service(LogServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .expect("server task");
    });

    let client = loop {
        match LogClient::connect(format!("http://{addr}")).await {
            Ok(client) => break client,
            Err(_) => tokio::task::yield_now().await,
        }
    };

    TestServer {
        client,
        storage,
        state,
        _server: server,
        _forwarder: forwarder,
    }
}
