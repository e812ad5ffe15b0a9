//! HTTP route entry point for `/api/...`.
//!
//! - `/health` → liveness probe
//! - `/attendance` → QR attendance flow and session records

use axum::Router;
use util::state::AppState;

use crate::routes::{attendance::attendance_routes, health::health_routes};

pub mod attendance;
pub mod health;

/// Builds the `/api` router with its state already applied, ready to be
/// nested by `main` or driven directly in tests.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .nest("/attendance", attendance_routes())
        .with_state(app_state)
}
