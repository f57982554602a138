use axum::{extract::State, http::StatusCode, response::Html};
use chrono::Utc;
use sysinfo::System;
use tracing::{debug, error};

use crate::render::{render_status_page, EnvironmentSnapshot, StatusPage};
use crate::state::AppState;
use crate::utils::format::{format_memory, format_uptime};

/// Version of the compiler this binary was built with, recorded by build.rs.
pub const RUNTIME_VERSION: &str = env!("STATUSBOARD_RUSTC_VERSION");

const UNKNOWN: &str = "Unknown";

/// The uptime read and the sysinfo refresh are blocking file I/O, so the
/// render runs on the blocking pool.
pub async fn status_page(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    tokio::task::spawn_blocking(move || render_current(&state)).await.map(Html).map_err(|e| {
        error!(?e, "status page render task failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Takes fresh readings and renders the page. Shared by the HTTP handler and
/// the one-shot `--render` CLI mode.
pub fn render_current(state: &AppState) -> String {
    let uptime_secs = state.metrics.uptime_seconds();
    let memory_bytes = state.metrics.memory_bytes();
    let uptime = format_uptime(uptime_secs);
    let memory = format_memory(memory_bytes);
    debug!(?uptime_secs, memory_bytes, %uptime, %memory, "Rendering status page");

    render_status_page(&StatusPage {
        env: capture_environment(state),
        deployment: &state.cfg.deployment,
        uptime,
        memory,
    })
}

fn capture_environment(state: &AppState) -> EnvironmentSnapshot {
    let cfg = &state.cfg;
    EnvironmentSnapshot {
        environment: cfg.environment.clone(),
        debug: cfg.debug,
        server_software: cfg.server_software.clone().unwrap_or_else(|| UNKNOWN.into()),
        runtime_version: RUNTIME_VERSION.into(),
        hostname: System::host_name().unwrap_or_else(|| UNKNOWN.into()),
        timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S %Z").to_string(),
    }
}
