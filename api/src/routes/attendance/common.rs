use db::attendance::{RecordRow, SessionPreview};
use db::models::attendance_record::AttendanceStatus;
use serde::{Deserialize, Serialize};
use url::Url;

/// Path of the student-facing scan page, relative to `APP_BASE_URL`.
pub const SCAN_PATH: &str = "attendance/scan";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueQrReq {
    pub session_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub expires_in_minutes: Option<i64>,
    pub late_after_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueQrResponse {
    pub token: String,
    pub qr_url: String,
    pub expires_at: String,
    pub late_after_minutes: i32,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPreviewResponse {
    pub session_id: i64,
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_code: String,
    pub section_name: String,
    pub grade_level: String,
    pub semester: Option<String>,
    pub school_year: Option<String>,
    pub session_date: String,
    pub session_time: Option<String>,
    pub late_after_minutes: i32,
    pub will_be_marked_as: AttendanceStatus,
    pub expires_at: Option<String>,
}

impl From<SessionPreview> for SessionPreviewResponse {
    fn from(p: SessionPreview) -> Self {
        Self {
            session_id: p.session_id,
            subject_id: p.subject_id,
            subject_name: p.subject_name,
            subject_code: p.subject_code,
            section_name: p.section_name,
            grade_level: p.grade_level,
            semester: p.semester,
            school_year: p.school_year,
            session_date: p.session_date.format("%Y-%m-%d").to_string(),
            session_time: p.session_time.map(|t| t.format("%H:%M:%S").to_string()),
            late_after_minutes: p.late_after_minutes,
            will_be_marked_as: p.will_be_marked_as,
            expires_at: p.expires_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInReq {
    pub token: Option<String>,
    pub student_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub status: AttendanceStatus,
    pub session_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_marked: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub id: i64,
    pub student_id: i64,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub status: AttendanceStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RecordRow> for RecordResponse {
    fn from(row: RecordRow) -> Self {
        Self {
            id: row.record.id,
            student_id: row.record.student_id,
            student_name: row.student_name,
            student_email: row.student_email,
            status: row.record.status,
            created_at: row.record.created_at.to_rfc3339(),
            updated_at: row.record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecordsResponse {
    pub session_id: i64,
    pub records: Vec<RecordResponse>,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateReq {
    pub records: Option<Vec<BulkRecordEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRecordEntry {
    pub student_id: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateResponse {
    pub session_id: i64,
    pub updated: usize,
}

/// Builds `<base>/attendance/scan?token=<token>`, keeping any path prefix on
/// the base URL.
pub fn build_qr_url(base: &str, token: &str) -> Result<String, url::ParseError> {
    let base = Url::parse(&format!("{}/", base.trim_end_matches('/')))?;
    let mut url = base.join(SCAN_PATH)?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url.into())
}
