use nvc_server::config::{Config, LogFormat, Transport};
use nvc_server::handlers::{health_handler, mcp_handler, ready_handler, resource_handler};
use nvc_server::protocol::stdio::serve_stdio;
use nvc_server::state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // stdout belongs to the protocol in stdio mode, so logs always go to stderr
    let json_logs = config.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nvc_server=info,tower_http=debug".into()),
        )
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    tracing::info!(transport = ?config.transport, "Starting NVC server");

    let start = std::time::Instant::now();
    let transport = config.transport;
    let state = Arc::new(AppState::new(config)?);
    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        tools = state.registry.tools().len(),
        resources = state.registry.resources().len(),
        "State initialized",
    );

    match transport {
        Transport::Stdio => run_stdio(state).await,
        Transport::Http => run_http(state).await,
    }
}

async fn run_stdio(state: Arc<AppState>) -> anyhow::Result<()> {
    state.mark_ready();
    tokio::select! {
        result = serve_stdio(state) => result?,
        _ = signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, stopping stdio transport");
        }
    }
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn run_http(state: Arc<AppState>) -> anyhow::Result<()> {
    let shutdown_timeout = state.config.shutdown_timeout_secs;
    let max_body_bytes = state.config.max_body_bytes;
    let addr: SocketAddr = format!("{}:{}", state.config.host, state.config.port).parse()?;

    // Set up Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    let app = Router::new()
        .route(
            "/mcp",
            post(mcp_handler).layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .route("/resources/*path", get(resource_handler))
        // Health endpoints
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        // Metrics endpoint
        .route(
            "/metrics",
            get(move || {
                let handle = prometheus_handle.clone();
                async move { handle.render() }
            }),
        )
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind(addr).await?;
    state.mark_ready();
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state, shutdown_timeout))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
/// After signal, `/ready` reports not ready and in-flight requests get
/// `timeout_secs` to complete.
async fn shutdown_signal(state: Arc<AppState>, timeout_secs: u64) {
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    state.mark_draining();
    tracing::info!(timeout_secs, "Draining connections...");
    tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
}
