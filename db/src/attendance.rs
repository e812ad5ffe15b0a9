//! QR attendance flow: issuing a token, previewing a session by token and
//! recording a check-in.
//!
//! Every operation takes the current instant and the school's UTC offset as
//! arguments, so the HTTP layer decides what "now" is and tests can pin it.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, TransactionTrait};
use tracing::{debug, info};

use crate::models::{
    attendance_record::{self, AttendanceStatus, CheckInOutcome},
    attendance_session::{self, generate_qr_token},
    grade_level, school_year, section, semester, subject, subject_student,
};

pub type AttendanceResult<T> = Result<T, AttendanceError>;

/// Longest lifetime a QR token may be issued with (one week).
pub const MAX_QR_EXPIRES_MINUTES: i64 = 7 * 24 * 60;

/// Failures of the attendance flow that callers map onto client errors.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("Invalid or expired QR code")]
    InvalidToken,

    #[error("QR code has expired")]
    Expired,

    #[error("You are not enrolled in this subject")]
    NotEnrolled,

    #[error("Attendance session not found")]
    SessionNotFound,

    #[error("{0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Builds the school's wall-clock offset; out-of-range values fall back to UTC.
pub fn school_offset(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

#[derive(Debug, Clone)]
pub struct IssueQr {
    pub session_id: i64,
    pub subject_id: i64,
    pub expires_in_minutes: i64,
    pub late_after_minutes: i32,
}

#[derive(Debug, Clone)]
pub struct IssuedQr {
    pub session_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub late_after_minutes: i32,
}

/// Generates a token and stores it on the session, replacing any previous one.
pub async fn issue_qr(
    db: &DatabaseConnection,
    req: IssueQr,
    now: DateTime<Utc>,
) -> AttendanceResult<IssuedQr> {
    if req.expires_in_minutes <= 0 {
        return Err(AttendanceError::Invalid(
            "expiresInMinutes must be a positive number of minutes".into(),
        ));
    }
    if req.expires_in_minutes > MAX_QR_EXPIRES_MINUTES {
        return Err(AttendanceError::Invalid(format!(
            "expiresInMinutes cannot exceed {MAX_QR_EXPIRES_MINUTES}"
        )));
    }
    if req.late_after_minutes < 0 {
        return Err(AttendanceError::Invalid(
            "lateAfterMinutes cannot be negative".into(),
        ));
    }

    let token = generate_qr_token();
    let expires_at = Duration::try_minutes(req.expires_in_minutes)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| AttendanceError::Invalid("expiresInMinutes is out of range".into()))?;

    let updated = attendance_session::Model::issue_qr_token(
        db,
        req.session_id,
        req.subject_id,
        &token,
        expires_at,
        req.late_after_minutes,
    )
    .await?;

    let Some(session) = updated else {
        return Err(AttendanceError::SessionNotFound);
    };

    info!(
        session_id = session.id,
        subject_id = session.subject_id,
        expires_at = %expires_at,
        late_after_minutes = req.late_after_minutes,
        "Issued attendance QR token"
    );

    Ok(IssuedQr {
        session_id: session.id,
        token,
        expires_at,
        late_after_minutes: session.allow_late_after_minutes,
    })
}

/// Display context of a session, following subject → section → grade level
/// → semester → school year.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session: attendance_session::Model,
    pub subject: subject::Model,
    pub section: section::Model,
    pub grade_level: grade_level::Model,
    pub semester: Option<semester::Model>,
    pub school_year: Option<school_year::Model>,
}

#[derive(Debug, Clone)]
pub struct SessionPreview {
    pub session_id: i64,
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_code: String,
    pub section_name: String,
    pub grade_level: String,
    pub semester: Option<String>,
    pub school_year: Option<String>,
    pub session_date: NaiveDate,
    pub session_time: Option<NaiveTime>,
    pub late_after_minutes: i32,
    pub will_be_marked_as: AttendanceStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Resolves a token to its session and display context.
///
/// A session whose subject, section or grade level row is missing does not
/// resolve, matching an inner join over the chain.
pub async fn find_session_context(
    db: &DatabaseConnection,
    token: &str,
) -> AttendanceResult<Option<SessionContext>> {
    let Some(session) = attendance_session::Model::find_by_qr_token(db, token).await? else {
        return Ok(None);
    };
    let Some(subject) = subject::Entity::find_by_id(session.subject_id).one(db).await? else {
        return Ok(None);
    };
    let Some(section) = section::Entity::find_by_id(subject.section_id).one(db).await? else {
        return Ok(None);
    };
    let Some(grade_level) = grade_level::Entity::find_by_id(section.grade_level_id)
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let semester = semester::Entity::find_by_id(grade_level.semester_id)
        .one(db)
        .await?;
    let school_year = match &semester {
        Some(s) => school_year::Entity::find_by_id(s.school_year_id).one(db).await?,
        None => None,
    };

    Ok(Some(SessionContext {
        session,
        subject,
        section,
        grade_level,
        semester,
        school_year,
    }))
}

/// Read-only preview of what scanning `token` at `now` would do.
pub async fn preview(
    db: &DatabaseConnection,
    token: &str,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> AttendanceResult<SessionPreview> {
    let ctx = find_session_context(db, token)
        .await?
        .ok_or(AttendanceError::InvalidToken)?;

    if ctx.session.is_expired(now) {
        return Err(AttendanceError::Expired);
    }

    let will_be_marked_as = ctx.session.classify_at(now, offset);
    debug!(session_id = ctx.session.id, %will_be_marked_as, "Previewed QR session");

    Ok(SessionPreview {
        session_id: ctx.session.id,
        subject_id: ctx.subject.id,
        subject_name: ctx.subject.name,
        subject_code: ctx.subject.code,
        section_name: ctx.section.name,
        grade_level: ctx.grade_level.name,
        semester: ctx.semester.map(|s| s.name),
        school_year: ctx.school_year.map(|y| y.name),
        session_date: ctx.session.session_date,
        session_time: ctx.session.session_time,
        late_after_minutes: ctx.session.allow_late_after_minutes,
        will_be_marked_as,
        expires_at: ctx.session.qr_expires_at,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckIn {
    pub session_id: i64,
    pub outcome: CheckInOutcome,
}

impl CheckIn {
    pub fn status(&self) -> AttendanceStatus {
        self.outcome.status()
    }

    pub fn already_marked(&self) -> bool {
        matches!(self.outcome, CheckInOutcome::AlreadyMarked(_))
    }
}

/// Records a student's scan of `token` at `now`.
///
/// An existing `absent` or `excused` record entered by the instructor is
/// replaced by the scanned status; a prior `present`/`late` is left alone.
pub async fn check_in(
    db: &DatabaseConnection,
    token: &str,
    student_id: i64,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> AttendanceResult<CheckIn> {
    let session = attendance_session::Model::find_by_qr_token(db, token)
        .await?
        .ok_or(AttendanceError::InvalidToken)?;

    if session.is_expired(now) {
        return Err(AttendanceError::Expired);
    }

    if !subject_student::Model::is_enrolled(db, session.subject_id, student_id).await? {
        return Err(AttendanceError::NotEnrolled);
    }

    let status = session.classify_at(now, offset);

    let txn = db.begin().await?;
    let outcome =
        attendance_record::Model::record_check_in(&txn, session.id, student_id, status, now)
            .await?;
    txn.commit().await?;

    match outcome {
        CheckInOutcome::Inserted(s) => {
            info!(session_id = session.id, student_id, status = %s, "Recorded QR check-in")
        }
        CheckInOutcome::Overwritten(s) => info!(
            session_id = session.id,
            student_id,
            status = %s,
            "QR check-in replaced instructor-entered status"
        ),
        CheckInOutcome::AlreadyMarked(s) => {
            debug!(session_id = session.id, student_id, status = %s, "Student already checked in")
        }
    }

    Ok(CheckIn {
        session_id: session.id,
        outcome,
    })
}

#[derive(Debug, Clone)]
pub struct RecordRow {
    pub record: attendance_record::Model,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
}

/// Lists every record of a session with the student's name.
pub async fn session_records(
    db: &DatabaseConnection,
    session_id: i64,
) -> AttendanceResult<Vec<RecordRow>> {
    if attendance_session::Entity::find_by_id(session_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(AttendanceError::SessionNotFound);
    }

    let rows = attendance_record::Model::list_for_session(db, session_id).await?;
    Ok(rows
        .into_iter()
        .map(|(record, student)| RecordRow {
            record,
            student_name: student.as_ref().map(|s| s.full_name.clone()),
            student_email: student.map(|s| s.email),
        })
        .collect())
}

/// Instructor bulk update: sets each `(student, status)` pair for the session
/// in one transaction. Every student must be enrolled in the session's subject.
pub async fn bulk_set_records(
    db: &DatabaseConnection,
    session_id: i64,
    entries: &[(i64, AttendanceStatus)],
    now: DateTime<Utc>,
) -> AttendanceResult<usize> {
    if entries.is_empty() {
        return Err(AttendanceError::Invalid("records must not be empty".into()));
    }

    let session = attendance_session::Entity::find_by_id(session_id)
        .one(db)
        .await?
        .ok_or(AttendanceError::SessionNotFound)?;

    for (student_id, _) in entries {
        if !subject_student::Model::is_enrolled(db, session.subject_id, *student_id).await? {
            return Err(AttendanceError::Invalid(format!(
                "Student {student_id} is not enrolled in this subject"
            )));
        }
    }

    let txn = db.begin().await?;
    for (student_id, status) in entries {
        attendance_record::Model::set_status(&txn, session.id, *student_id, *status, now).await?;
    }
    txn.commit().await?;

    info!(session_id, updated = entries.len(), "Bulk-updated attendance records");
    Ok(entries.len())
}
