//! Liveness and build information
//!
//! - `/health`: 200 while the process is serving, with the store backend in use
//! - `/version`: package version plus the git commit and build time baked in by
//!   `build.rs`

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::{json_response, BoxBody};
use crate::server::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub status: &'static str,
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    /// Ledger backend: "mongodb" or "memory"
    pub store: &'static str,
    pub mode: &'static str,
    pub timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub git_commit: &'static str,
    pub git_commit_full: &'static str,
    pub build_time: &'static str,
}

/// GET /health
pub fn handle_health(state: &AppState) -> Response<BoxBody> {
    let body = HealthResponse {
        healthy: true,
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        store: state.store.backend_name(),
        mode: if state.args.dev_mode { "development" } else { "production" },
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    json_response(StatusCode::OK, &body)
}

/// GET /version
pub fn handle_version() -> Response<BoxBody> {
    let body = VersionResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        git_commit: env!("GIT_COMMIT_SHORT"),
        git_commit_full: env!("GIT_COMMIT_FULL"),
        build_time: env!("BUILD_TIMESTAMP"),
    };
    json_response(StatusCode::OK, &body)
}
