use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::{SecondsFormat, Utc};
use db::attendance::{self, IssueQr};
use tracing::error;
use util::{config, state::AppState};

use super::common::{IssueQrReq, IssueQrResponse, build_qr_url};
use crate::response::{ApiError, ApiResult};

/// POST /api/attendance/qr
///
/// Issues a fresh QR token for a session, invalidating any earlier one.
///
/// ### Request Body
/// ```json
/// { "sessionId": 12, "subjectId": 3, "expiresInMinutes": 60, "lateAfterMinutes": 15 }
/// ```
/// `expiresInMinutes` and `lateAfterMinutes` are optional and default to
/// `QR_DEFAULT_EXPIRES_MINUTES` / `QR_DEFAULT_LATE_AFTER_MINUTES`.
///
/// ### Responses
/// - `200 OK` `{ token, qrUrl, expiresAt, lateAfterMinutes }`
/// - `400 Bad Request` missing ids or out-of-range minutes
/// - `404 Not Found` no session with that id under that subject
pub async fn issue_qr(
    State(state): State<AppState>,
    body: Result<Json<IssueQrReq>, JsonRejection>,
) -> ApiResult<Json<IssueQrResponse>> {
    let Json(body) = body?;

    let (Some(session_id), Some(subject_id)) = (body.session_id, body.subject_id) else {
        return Err(ApiError::validation("sessionId and subjectId are required"));
    };

    let req = IssueQr {
        session_id,
        subject_id,
        expires_in_minutes: body
            .expires_in_minutes
            .unwrap_or_else(config::qr_default_expires_minutes),
        late_after_minutes: body
            .late_after_minutes
            .unwrap_or_else(config::qr_default_late_after_minutes),
    };

    let issued = attendance::issue_qr(state.db(), req, Utc::now())
        .await
        .map_err(|e| ApiError::from_attendance(e, "Failed to generate QR code"))?;

    let qr_url = build_qr_url(&config::app_base_url(), &issued.token).map_err(|e| {
        error!(error = %e, base_url = %config::app_base_url(), "APP_BASE_URL is not a valid URL");
        ApiError::internal("Failed to generate QR code")
    })?;

    Ok(Json(IssueQrResponse {
        token: issued.token,
        qr_url,
        expires_at: issued.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        late_after_minutes: issued.late_after_minutes,
    }))
}
