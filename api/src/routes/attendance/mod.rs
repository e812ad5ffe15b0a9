//! `/api/attendance` routes: QR token issue, preview and check-in, plus the
//! instructor view of a session's records.

use axum::{Router, routing::get};
use util::state::AppState;

mod common;
mod get;
mod post;
mod put;

pub use get::{list_session_records, preview_qr};
pub use post::issue_qr;
pub use put::{check_in, update_session_records};

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/qr", get(preview_qr).post(issue_qr).put(check_in))
        .route(
            "/sessions/{session_id}/records",
            get(list_session_records).put(update_session_records),
        )
}
