use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::Utc;
use db::attendance::{self, school_offset};
use db::models::attendance_record::AttendanceStatus;
use std::str::FromStr;
use util::{config, state::AppState};

use super::common::{BulkUpdateReq, BulkUpdateResponse, CheckInReq, CheckInResponse};
use crate::response::{ApiError, ApiResult};

/// PUT /api/attendance/qr
///
/// Records a student's QR check-in.
///
/// ### Request Body
/// ```json
/// { "token": "9f86d0…", "studentId": 42 }
/// ```
///
/// ### Responses
/// - `200 OK` `{ "status": "present", "sessionId": 12 }`, with
///   `"alreadyMarked": true` when the student had already checked in
/// - `400 Bad Request` missing token or student id
/// - `403 Forbidden` student not enrolled in the subject
/// - `404 Not Found` unknown token
/// - `410 Gone` token expired
pub async fn check_in(
    State(state): State<AppState>,
    body: Result<Json<CheckInReq>, JsonRejection>,
) -> ApiResult<Json<CheckInResponse>> {
    let Json(body) = body?;

    let token = body.token.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let (Some(token), Some(student_id)) = (token, body.student_id) else {
        return Err(ApiError::validation("token and studentId are required"));
    };

    let offset = school_offset(config::school_utc_offset_minutes());
    let result = attendance::check_in(state.db(), token, student_id, Utc::now(), offset)
        .await
        .map_err(|e| ApiError::from_attendance(e, "Failed to record attendance"))?;

    Ok(Json(CheckInResponse {
        status: result.status(),
        session_id: result.session_id,
        already_marked: result.already_marked().then_some(true),
    }))
}

/// PUT /api/attendance/sessions/{session_id}/records
///
/// Instructor bulk update of statuses for a session.
///
/// ### Request Body
/// ```json
/// { "records": [{ "studentId": 42, "status": "absent" }, { "studentId": 43, "status": "excused" }] }
/// ```
///
/// ### Responses
/// - `200 OK` `{ "sessionId": 12, "updated": 2 }`
/// - `400 Bad Request` empty list, unknown status or a student outside the subject
/// - `404 Not Found` unknown session
pub async fn update_session_records(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    body: Result<Json<BulkUpdateReq>, JsonRejection>,
) -> ApiResult<Json<BulkUpdateResponse>> {
    let Json(body) = body?;

    let entries = body
        .records
        .unwrap_or_default()
        .into_iter()
        .map(|entry| {
            let student_id = entry
                .student_id
                .ok_or_else(|| ApiError::validation("Each record needs a studentId"))?;
            let raw = entry.status.unwrap_or_default();
            let status = AttendanceStatus::from_str(raw.trim()).map_err(|_| {
                ApiError::validation(format!("Unknown attendance status '{raw}'"))
            })?;
            Ok((student_id, status))
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let updated = attendance::bulk_set_records(state.db(), session_id, &entries, Utc::now())
        .await
        .map_err(|e| ApiError::from_attendance(e, "Failed to update attendance records"))?;

    Ok(Json(BulkUpdateResponse {
        session_id,
        updated,
    }))
}
