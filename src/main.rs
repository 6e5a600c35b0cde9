use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use sealgate::api::{create_router, AppState, HttpUpstream};
use sealgate::config::Config;
use sealgate::gate::Gate;
use sealgate::observability::{init_tracing, MetricsRegistry};
use sealgate::policy::PolicyLoader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize tracing
    init_tracing(&config.log_level, config.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting sealgate"
    );

    let key = config
        .secret_key()
        .context("Invalid SEALGATE_ENCRYPTION_KEY")?;

    // Load policy once; it is immutable for the life of the process
    let loader = PolicyLoader::new(
        config
            .policy_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
    )
    .with_freshness_window_ms(config.freshness_window_ms)
    .with_suspect_score_threshold(config.suspect_score_threshold);

    let (policy, ruleset) = loader.load().context("Failed to load policy")?;
    info!(
        policy_version = %policy.version,
        rules = ruleset.len(),
        freshness_window_ms = policy.params.freshness_window_ms,
        suspect_score_threshold = policy.params.suspect_score_threshold,
        "Loaded policy"
    );

    let gate = Gate::new(key, Arc::new(ruleset)).with_max_inflated_bytes(config.max_inflated_bytes);

    let upstream = HttpUpstream::new(&config.origin_url, config.upstream_timeout())
        .context("Failed to create origin client")?;
    info!(origin = %config.origin_url, "Forwarding allowed requests");

    // Create application state
    let state = Arc::new(AppState {
        gate: Arc::new(gate),
        upstream: Arc::new(upstream),
        metrics: Arc::new(MetricsRegistry::new()),
        start_time: Instant::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        max_body_bytes: config.max_body_bytes,
    });

    // Create router
    let app = create_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.listen_addr))?;

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Run server with graceful shutdown
    if config.graceful_shutdown {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        axum::serve(listener, app).await?;
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
