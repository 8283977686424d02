//! Gateway server binary: loads config, bootstraps the message store, binds
//! every configured SMPP transceiver, starts the drain scheduler and
//! delivery demultiplexer, and serves the HTTP intake surface.
//!
//! Replaces the teacher's `send_sms`/tester binaries for this crate's build
//! surface; those remain as `demos/` examples against the SMPP client layer.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use smpp::config::GatewayConfig;
use smpp::demux;
use smpp::http::{self, AppState};
use smpp::pool::SessionPool;
use smpp::scheduler::DrainScheduler;
use smpp::session::{SessionConfig, TransceiverSession};
use smpp::store::MySqlMessageStore;

/// SMS gateway: HTTP intake, durable queue and SMPP 3.4 delivery.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the gateway's JSON config file.
    config_path: String,
}

/// Receipt channel capacity. Sends on it block once full: the demultiplexer
/// is expected to keep up with every session's inbound receipt stream.
const RECEIPT_CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = GatewayConfig::load(&args.config_path)?;
    init_logging(config.log_file.as_deref())?;

    info!(config_path = %args.config_path, "starting smppgate");

    let store = Arc::new(MySqlMessageStore::connect(&config.mysql).await?);

    let (receipt_tx, receipt_rx) = mpsc::channel(RECEIPT_CHANNEL_CAPACITY);
    let mut sessions = Vec::with_capacity(config.connect_uri.len());
    for uri in &config.connect_uri {
        let session_config = SessionConfig::parse(uri)?;
        sessions.push(TransceiverSession::new(session_config, receipt_tx.clone()));
    }
    let pool = Arc::new(SessionPool::new(sessions));
    pool.start_all();

    let demux_store = Arc::clone(&store);
    tokio::spawn(async move { demux::run(demux_store.as_ref(), receipt_rx).await });

    let scheduler = Arc::new(DrainScheduler::new(
        Arc::clone(&store),
        Arc::clone(&pool),
        config.send_disabled,
    ));
    let flush = scheduler.spawn();

    let state = Arc::new(AppState {
        store: Arc::clone(&store),
        flush,
    });
    let app = http::router(state, &config.project_path, config.forward_secret.clone());

    let addr: SocketAddr = config
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen address '{}': {e}", config.listen))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(listen = %addr, "http intake listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "http server exited");
        return Err(e.into());
    }

    Ok(())
}

fn init_logging(log_file: Option<&str>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("can't open log file {path}: {e}"))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            // Leak the guard: it must outlive the process for the
            // non-blocking writer to flush, and main() never returns early.
            Box::leak(Box::new(guard));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .json()
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}
