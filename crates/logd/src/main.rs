use anyhow::Context;
use clap::Parser;
use log_proto::log_server::LogServer;
use logd_cli::{LogArgs, OrBail};
use std::net::SocketAddr;
use std::sync::Arc;

/// A single-node instance of the Log service, backed by an in-memory
/// Storage Adapter. Intended for development and for exercising
/// `log-server` end to end; a production deployment would swap
/// `log-memstore::MemoryAdapter` for an adapter backed by a real
/// consensus/persistence layer without changing anything else here.
#[derive(Parser, Debug)]
#[command(name = "logd", version, about)]
struct Args {
    /// Address to bind the gRPC listener to.
    #[arg(long, env = "LOGD_BIND", default_value = "0.0.0.0:7070")]
    bind: SocketAddr,

    /// Approximate total byte capacity advertised via Info/InfoStream and
    /// enforced by the in-memory Storage Adapter.
    #[arg(long, env = "LOGD_CAPACITY_BYTES", default_value_t = 1 << 30)]
    capacity_bytes: u64,

    /// Maximum number of in-flight proposals an Append stream may have
    /// outstanding before the server stops reading further requests.
    #[arg(long, env = "LOGD_APPEND_HIGH_WATER_MARK", default_value_t = log_server::DEFAULT_APPEND_HIGH_WATER_MARK)]
    append_high_water_mark: usize,

    /// If set, clients must present this value as a `Bearer` token on every
    /// RPC. Unset disables authentication.
    #[arg(long, env = "LOGD_BEARER_TOKEN")]
    bearer_token: Option<String>,

    #[command(flatten)]
    log_args: LogArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logd_cli::init_logging(&args.log_args);

    let storage = Arc::new(log_memstore::MemoryAdapter::new(args.capacity_bytes));
    let state = Arc::new(log_core::LogState::new(args.capacity_bytes));

    let service = log_server::LogService::new(storage.clone(), state.clone())
        .with_high_water_mark(args.append_high_water_mark);
    let _commit_forwarder = service.spawn_commit_forwarder();

    let interceptor =
        log_server::Interceptor::new(args.bearer_token).or_bail("invalid bearer token");

    tracing::info!(bind = %args.bind, "starting log service");

    tonic::transport::Server::builder()
        .add_service(LogServer::with_interceptor(service, interceptor))
        .serve(args.bind)
        .await
        .context("log service exited")?;

    Ok(())
}
