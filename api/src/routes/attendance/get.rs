use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use chrono::Utc;
use db::attendance::{self, school_offset};
use util::{config, state::AppState};

use super::common::{PreviewQuery, RecordResponse, SessionPreviewResponse, SessionRecordsResponse};
use crate::response::{ApiError, ApiResult};

/// GET /api/attendance/qr?token=...
///
/// Read-only preview of the session behind a token, including the status a
/// check-in right now would receive. Nothing is written.
///
/// ### Responses
/// - `200 OK` session context plus `willBeMarkedAs`
/// - `400 Bad Request` missing or blank `token`
/// - `404 Not Found` `{ "error": "Invalid or expired QR code" }`
/// - `410 Gone` `{ "error": "QR code has expired" }`
pub async fn preview_qr(
    State(state): State<AppState>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> ApiResult<Json<SessionPreviewResponse>> {
    let Query(query) = query?;
    let token = query
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("token is required"))?;

    let offset = school_offset(config::school_utc_offset_minutes());
    let preview = attendance::preview(state.db(), token, Utc::now(), offset)
        .await
        .map_err(|e| ApiError::from_attendance(e, "Failed to validate QR code"))?;

    Ok(Json(preview.into()))
}

/// GET /api/attendance/sessions/{session_id}/records
///
/// Every record of the session with the student's name, ordered by name.
pub async fn list_session_records(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> ApiResult<Json<SessionRecordsResponse>> {
    let rows = attendance::session_records(state.db(), session_id)
        .await
        .map_err(|e| ApiError::from_attendance(e, "Failed to load attendance records"))?;

    Ok(Json(SessionRecordsResponse {
        session_id,
        records: rows.into_iter().map(RecordResponse::from).collect(),
    }))
}
