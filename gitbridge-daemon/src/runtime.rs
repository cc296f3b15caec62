use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use gitbridge_core::BridgeConfig;

use crate::bridge::Bridge;
use crate::error::{io_err, DaemonError};
use crate::protocol::StatusSnapshot;
use crate::webhook;

/// Selects JSON log lines instead of the human format.
pub const ENV_LOG_FORMAT: &str = "GITBRIDGE_LOG_FORMAT";

#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<Bridge>,
}

/// HTTP surface: both webhook endpoints plus `/status`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/githubhooks", post(webhook::github_hook))
        .route("/gitlabhooks", post(webhook::gitlab_hook))
        .route("/status", get(status))
        .with_state(state)
}

async fn status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.bridge.snapshot())
}

/// Start the bridge and block the current thread until it exits.
pub fn start_blocking(config: BridgeConfig) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Initialize the repository pair, bind the listener and serve until Ctrl-C.
///
/// Every error returned from here is a startup failure; once serving,
/// per-event failures are logged by the handlers and never end the process.
pub async fn run(config: BridgeConfig) -> Result<(), DaemonError> {
    tracing::info!(?config, "starting gitbridge");
    let port = config.port;
    let bridge = tokio::task::spawn_blocking(move || Bridge::from_config(&config))
        .await
        .map_err(|err| DaemonError::Protocol(format!("startup task join error: {err}")))??;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| DaemonError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    let (shutdown_tx, _) = broadcast::channel::<()>(4);
    serve(listener, Arc::new(bridge), shutdown_tx).await
}

/// Serve on an already-bound listener until Ctrl-C or a message on `shutdown`.
pub async fn serve(
    listener: TcpListener,
    bridge: Arc<Bridge>,
    shutdown: broadcast::Sender<()>,
) -> Result<(), DaemonError> {
    let local = listener
        .local_addr()
        .map_err(|e| io_err("listener", e))?;
    tracing::info!(addr = %local, "listening for webhooks");

    let server_handle = {
        let shutdown = shutdown.clone();
        let mut shutdown_rx = shutdown.subscribe();
        let app = router(AppState { bridge });
        tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
                .map_err(|e| DaemonError::Protocol(format!("http server on {local}: {e}")));
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Protocol(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let (server_result, signal_result) = tokio::join!(server_handle, signal_handle);
    handle_join("http_server", server_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Protocol(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

/// Install the global subscriber (stderr; `RUST_LOG` filter, default `info`).
/// Records from the `log` facade are forwarded. Later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(ENV_LOG_FORMAT).is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let _ = if json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()
    };
}
