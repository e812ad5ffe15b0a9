use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::user;

/// A student's attendance in one session. At most one row exists per
/// `(session_id, student_id)`; the database enforces it with a unique index.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,

    #[sea_orm(string_value = "absent")]
    Absent,

    #[sea_orm(string_value = "late")]
    Late,

    #[sea_orm(string_value = "excused")]
    Excused,
}

impl AttendanceStatus {
    /// Whether the student has already checked in (as opposed to an
    /// instructor-entered absence or excuse).
    pub fn is_checked_in(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

/// What a QR check-in did to the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// No record existed; one was created.
    Inserted(AttendanceStatus),
    /// An `absent`/`excused` record was replaced by the scanned status.
    Overwritten(AttendanceStatus),
    /// The student had already checked in; nothing was written.
    AlreadyMarked(AttendanceStatus),
}

impl CheckInOutcome {
    pub fn status(&self) -> AttendanceStatus {
        match *self {
            CheckInOutcome::Inserted(s)
            | CheckInOutcome::Overwritten(s)
            | CheckInOutcome::AlreadyMarked(s) => s,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_session::Entity",
        from = "Column::SessionId",
        to = "super::attendance_session::Column::Id"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}
impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn pair_conflict() -> OnConflict {
    OnConflict::columns([Column::SessionId, Column::StudentId])
}

impl Model {
    pub async fn find_for<C>(db: &C, session_id: i64, student_id: i64) -> Result<Option<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::StudentId.eq(student_id))
            .one(db)
            .await
    }

    /// Records a QR check-in without a read-then-write race.
    ///
    /// 1. insert, doing nothing if the pair already exists;
    /// 2. otherwise flip an `absent`/`excused` row to `status`;
    /// 3. otherwise the student already checked in and the stored row wins.
    ///
    /// Every step is a single statement guarded by the unique index, so
    /// concurrent scans of the same pair always end with exactly one row.
    pub async fn record_check_in<C>(
        db: &C,
        session_id: i64,
        student_id: i64,
        status: AttendanceStatus,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome, DbErr>
    where
        C: ConnectionTrait,
    {
        let inserted = Entity::insert(ActiveModel {
            session_id: Set(session_id),
            student_id: Set(student_id),
            status: Set(status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .on_conflict(pair_conflict().do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

        if inserted > 0 {
            return Ok(CheckInOutcome::Inserted(status));
        }

        let overwritten = Entity::update_many()
            .col_expr(Column::Status, Expr::value(status.to_value()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Status.is_in([
                AttendanceStatus::Absent.to_value(),
                AttendanceStatus::Excused.to_value(),
            ]))
            .exec(db)
            .await?;

        if overwritten.rows_affected > 0 {
            return Ok(CheckInOutcome::Overwritten(status));
        }

        match Self::find_for(db, session_id, student_id).await? {
            Some(existing) => Ok(CheckInOutcome::AlreadyMarked(existing.status)),
            None => Err(DbErr::RecordNotFound(format!(
                "attendance record for session {session_id}, student {student_id} vanished during check-in"
            ))),
        }
    }

    /// Instructor write: sets the status for the pair, inserting or replacing.
    pub async fn set_status<C>(
        db: &C,
        session_id: i64,
        student_id: i64,
        status: AttendanceStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::insert(ActiveModel {
            session_id: Set(session_id),
            student_id: Set(student_id),
            status: Set(status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .on_conflict(
            pair_conflict()
                .update_columns([Column::Status, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
        Ok(())
    }

    /// All records of a session with the student row, ordered by student name.
    pub async fn list_for_session<C>(
        db: &C,
        session_id: i64,
    ) -> Result<Vec<(Self, Option<user::Model>)>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .find_also_related(user::Entity)
            .order_by_asc(user::Column::FullName)
            .order_by_asc(Column::StudentId)
            .all(db)
            .await
    }
}
