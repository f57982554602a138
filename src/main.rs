use anyhow::Result;
use sysinfo::System;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod cli;
mod config;
mod metrics;
mod render;
mod state;
mod utils;

use crate::api::handlers::render_current;
use crate::cli::CliAction;
use crate::config::{load_config, EffectiveConfig};
use crate::state::AppState;
use crate::utils::format::format_memory;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = match crate::cli::parse_args() {
        CliAction::InitConfig(path) => return crate::cli::init_config_file(&path),
        CliAction::RenderOnce(path) => {
            // stdout carries the page, so diagnostics go to stderr
            let loaded = load_config(&path, false);
            fmt::fmt().with_writer(std::io::stderr).with_target(false).compact().init();
            loaded.log_diagnostics();
            print!("{}", render_current(&AppState::new(loaded.cfg)));
            return Ok(());
        }
        CliAction::RunServer(path) => path,
    };
    let loaded = load_config(&config_path, true);
    let _log_guard = init_logging(&loaded.cfg);
    loaded.log_diagnostics();
    let cfg = loaded.cfg;

    let mut sys = System::new_all();
    sys.refresh_all();
    let version = env!("CARGO_PKG_VERSION");
    let os = System::name().unwrap_or_else(|| "Unknown OS".into());
    let os_ver = System::os_version().unwrap_or_default();
    let cpu_brand = sys.cpus().first().map(|c| c.brand().to_string()).unwrap_or_else(|| "Unknown CPU".into());
    if sys.total_memory() == 0 {
        warn!("Unable to determine RAM size");
    }

    info!(
        version,
        os = %format!("{} {}", os, os_ver),
        cpu = %cpu_brand,
        ram = %format_memory(sys.total_memory()),
        environment = %cfg.environment,
        debug = cfg.debug,
        "Statusboard starting"
    );

    let state = AppState::new(cfg);

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .ok();

    let app = crate::api::router(state.clone());

    let bind_addr = (state.cfg.host.as_str(), state.cfg.port);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %format!("{}:{}", state.cfg.host, state.cfg.port), "Listening");

    let shutdown = async move {
        let _ = shutdown_rx.recv().await;
        info!("Shutdown signal received");
    };
    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        error!(?e, "server error");
    }

    Ok(())
}

/// Stdout plus `latest.log` in `STATUSBOARD_LOG_DIR`. The returned guard must
/// live as long as the process or buffered file lines are lost.
fn init_logging(cfg: &EffectiveConfig) -> Option<WorkerGuard> {
    let logs_dir_str = std::env::var("STATUSBOARD_LOG_DIR").unwrap_or_else(|_| ".logs".into());
    let logs_dir = std::path::Path::new(&logs_dir_str);

    let stdout_layer = fmt::layer().with_target(false).compact();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter).with(stdout_layer);

    match std::fs::create_dir_all(logs_dir) {
        Ok(()) => {
            if cfg.clean_log_on_start {
                let log_path = logs_dir.join("latest.log");
                if let Ok(f) =
                    std::fs::OpenOptions::new().create(true).write(true).truncate(true).open(&log_path)
                {
                    drop(f);
                }
            }
            let file_appender = rolling::never(logs_dir, "latest.log");
            let (file_nb, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer().with_ansi(false).with_target(false).with_writer(file_nb).compact();
            registry.with(file_layer).init();
            Some(guard)
        }
        Err(e) => {
            eprintln!("File logging disabled (cannot create {}): {}", logs_dir.display(), e);
            registry.init();
            None
        }
    }
}
