use std::{future::Future, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use service::{CsvPollStore, PollService, PollStore};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

/// Config file when present, env vars otherwise; validated either way.
pub fn load_config() -> Result<AppConfig, StartupError> {
    AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(format!("{e:#}")))
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Open the CSV poll table named in the config and wrap it in the service.
/// The store creates the table and its directory when they are missing.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    let path = PathBuf::from(&cfg.storage.polls_file);
    let store: Arc<dyn PollStore> = Arc::new(CsvPollStore::new(path));
    let polls = PollService::new(store, cfg.storage.max_options)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;
    Ok(ServerState::new(polls))
}

/// Run the HTTP server until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    run_until(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl+C; serving until killed");
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Build the app and serve until `shutdown` resolves. Requests already being
/// handled, including poll table rewrites, finish before this returns.
pub async fn run_until<F>(shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    dotenv().ok();

    let cfg = load_config()?;
    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state);

    let addr = bind_addr(&cfg)?;
    let listener = TcpListener::bind(addr).await?;
    serve(listener, app, shutdown).await?;
    info!(%addr, "poll server drained");
    Ok(())
}

async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = ?listener.local_addr().ok(), "serving poll board");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("shutdown requested; draining in-flight requests");
        })
        .await
}
