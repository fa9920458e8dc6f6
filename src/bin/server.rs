//! Tripod HTTP server binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tripod::server::{serve, AppState};
use tripod::{FileFetcher, NTriplesParser, Store, StoreOptions};

/// Serve a triple store over HTTP.
#[derive(Debug, Parser)]
#[command(name = "tripod-server", version, about)]
struct Args {
    /// Path of the store file (created on first open).
    db: PathBuf,

    /// Port to listen on.
    #[arg(short, long, env = "TRIPOD_PORT", default_value_t = 8088)]
    port: u16,

    /// Address to bind.
    #[arg(long, env = "TRIPOD_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// Seconds allowed for a single load fetch.
    #[arg(long, default_value_t = 30)]
    fetch_timeout: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> tripod::Result<()> {
    let options = StoreOptions {
        fetch_timeout: Duration::from_secs(args.fetch_timeout),
    };
    let store = Arc::new(Store::open_with(
        &args.db,
        options,
        Box::new(FileFetcher),
        Box::new(NTriplesParser),
    )?);
    let state = Arc::new(AppState::new(store)?);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .map_err(|e| {
            tripod::StoreError::InvalidArgument(format!("bad bind address: {e}"))
        })?;
    serve(state, addr).await
}
