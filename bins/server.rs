use std::process::ExitCode;

use common::utils::logging::{init_logging, LogFormat};
use tracing::{error, info};
use uuid::Uuid;

fn main() -> ExitCode {
    // .env must be read before the subscriber looks at RUST_LOG and LOG_FORMAT.
    dotenvy::dotenv().ok();
    let format = LogFormat::from_env();
    init_logging(format);

    let instance = Uuid::new_v4();
    std::panic::set_hook(Box::new(move |info| {
        error!(%instance, message = %info, "panic");
    }));

    let cfg = match configs::AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = ?e, "refusing to start with a bad config");
            return ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = cfg.server.worker_threads {
        builder.worker_threads(threads);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "cannot build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        %instance,
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        threads = ?cfg.server.worker_threads,
        "poll board starting"
    );

    // The server drains in-flight requests on Ctrl+C before run() returns,
    // so a poll table rewrite is never cut off by the signal.
    match rt.block_on(server::run()) {
        Ok(()) => {
            info!(%instance, "poll board stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(%instance, error = ?e, "poll board failed");
            ExitCode::FAILURE
        }
    }
}
