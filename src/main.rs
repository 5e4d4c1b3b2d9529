use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tutor_voice::{create_router, AppState, Config, NatsChannelFactory, NatsHistoryRecorder};

#[derive(Debug, Parser)]
#[command(name = "tutor-voice", about = "Voice lesson controller for AI tutors")]
struct Args {
    /// Config file path (extension optional)
    #[arg(short, long, default_value = "config/tutor-voice")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Tutor Voice v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    info!("Connecting to NATS at {}", cfg.nats.url);
    let client = async_nats::connect(cfg.nats.url.as_str())
        .await
        .context("Failed to connect to NATS")?;

    let state = AppState::new(
        Arc::new(NatsChannelFactory::new(client.clone())),
        Arc::new(NatsHistoryRecorder::new(client, cfg.nats.history_subject.clone())),
        cfg.session_options(),
    )
    .with_finished_retention(cfg.finished_retention());

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .await
        .context("HTTP server failed")?;

    Ok(())
}
