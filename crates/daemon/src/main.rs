use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use p2n_core::config::{LogLevel, DEFAULT_SECRETS_DIR};
use p2n_core::{
    load_config, resolve_credentials, validate_config, Config, CycleRunner, ExcelWriter,
    NextcloudClient, NextcloudPublisher, PipelineSettings, PretixClient, ReportPipeline,
    RunnerSchedule,
};
use p2n_daemon::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Config path from P2N_CONFIG or the first argument; without one, only
    // defaults and the environment apply.
    let config_path = std::env::var("P2N_CONFIG")
        .ok()
        .or_else(|| std::env::args().nth(1))
        .map(PathBuf::from);

    let loaded = load_config(config_path.as_deref());
    init_logging(
        loaded
            .as_ref()
            .map(|config| config.logging.level)
            .unwrap_or_default(),
    );

    info!("Starting p2n {}", VERSION);
    let config = loaded.with_context(|| match &config_path {
        Some(path) => format!("Failed to load config from {:?}", path),
        None => "Failed to load config".to_string(),
    })?;
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    if config.report.docker_image == "unknown" {
        warn!("Docker image version is not set (DOCKER_IMAGE)");
    }

    let secrets_dir = std::env::var("P2N_SECRETS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_DIR));
    let credentials =
        resolve_credentials(&config, &secrets_dir).context("Failed to resolve credentials")?;

    let (runner, event_url) = build_runner(&config, credentials)?;
    let status = runner.status();

    let (shutdown_tx, _) = broadcast::channel(1);

    // Status server
    let server_handle = if config.status.enabled {
        let addr = SocketAddr::new(config.status.host, config.status.port);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;
        info!("Status server listening on {}", addr);

        let app = create_router(Arc::new(AppState::new(event_url, status)));
        let mut shutdown_rx = shutdown_tx.subscribe();
        Some(tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
        }))
    } else {
        None
    };

    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        let _ = signal_tx.send(());
    });

    // Runs until shutdown, or after one cycle when run_once is set
    runner.run(shutdown_tx.subscribe()).await;

    let _ = shutdown_tx.send(());
    if let Some(handle) = server_handle {
        handle
            .await
            .context("Status server task failed")?
            .context("Status server error")?;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Wire the pretix source, the Nextcloud publisher and the pipeline.
fn build_runner(
    config: &Config,
    credentials: p2n_core::Credentials,
) -> Result<(CycleRunner, String)> {
    let pretix = PretixClient::new(
        &config.pretix,
        credentials.pretix_token,
        config.http.clone(),
    )
    .context("Failed to create pretix client")?;
    let event_url = pretix.event_url().to_string();
    info!("Reading orders from {}", event_url);

    let nextcloud = NextcloudClient::new(
        &config.nextcloud,
        credentials.nextcloud,
        config.http.clone(),
    )
    .context("Failed to create Nextcloud client")?;
    info!(
        "Publishing to {} in '{}'",
        config.nextcloud.url, config.nextcloud.upload_dir
    );

    let excel = ExcelWriter::new(&config.excel.temp_dir_name, config.excel.max_column_width)
        .context("Failed to prepare spreadsheet directory")?;

    let settings = PipelineSettings::from_config(config).context("Invalid report settings")?;
    let pipeline = ReportPipeline::new(
        Arc::new(pretix),
        Arc::new(NextcloudPublisher::new(nextcloud, excel)),
        settings,
    );

    Ok((
        CycleRunner::new(pipeline, RunnerSchedule::from(&config.schedule)),
        event_url,
    ))
}

/// RUST_LOG wins over the configured level. P2N_LOG_FORMAT=json switches
/// to JSON lines.
fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{},tower_http=info", level.as_filter()).into());

    let json = std::env::var("P2N_LOG_FORMAT").is_ok_and(|format| format == "json");
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
