use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::RngCore;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr, QueryFilter};
use serde::Serialize;

use super::attendance_record::AttendanceStatus;

/// Default grace period after the session start before a check-in counts as late.
pub const DEFAULT_LATE_AFTER_MINUTES: i32 = 15;

/// Number of random bytes behind a QR token (hex encoded to twice as many chars).
pub const QR_TOKEN_BYTES: usize = 32;

/// One scheduled attendance-taking event for a subject.
///
/// `session_date`/`session_time` are wall-clock values in the school's time
/// zone. `qr_token` is a short-lived capability: it is only ever compared by
/// exact match and is overwritten, never appended, when a new one is issued.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub subject_id: i64,
    pub session_date: NaiveDate,
    pub session_time: Option<NaiveTime>,
    #[serde(skip_serializing)]
    pub qr_token: Option<String>,
    pub qr_expires_at: Option<DateTime<Utc>>,
    pub allow_late_after_minutes: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id"
    )]
    Subject,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    Records,
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Generates an unguessable QR token: 256 bits from the OS RNG, hex encoded.
pub fn generate_qr_token() -> String {
    let mut buf = [0u8; QR_TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

impl Model {
    pub async fn create<C>(
        db: &C,
        subject_id: i64,
        session_date: NaiveDate,
        session_time: Option<NaiveTime>,
        allow_late_after_minutes: Option<i32>,
    ) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        ActiveModel {
            subject_id: Set(subject_id),
            session_date: Set(session_date),
            session_time: Set(session_time),
            qr_token: Set(None),
            qr_expires_at: Set(None),
            allow_late_after_minutes: Set(
                allow_late_after_minutes.unwrap_or(DEFAULT_LATE_AFTER_MINUTES),
            ),
            is_visible: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Stores a fresh token on the session identified by `(id, subject_id)`.
    ///
    /// Returns `Ok(None)` when no session matches the pair. Any previously
    /// issued token stops validating as soon as this update lands.
    pub async fn issue_qr_token<C>(
        db: &C,
        id: i64,
        subject_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
        late_after_minutes: i32,
    ) -> Result<Option<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = Entity::update_many()
            .col_expr(Column::QrToken, Expr::value(token.to_owned()))
            .col_expr(Column::QrExpiresAt, Expr::value(expires_at))
            .col_expr(Column::AllowLateAfterMinutes, Expr::value(late_after_minutes))
            .filter(Column::Id.eq(id))
            .filter(Column::SubjectId.eq(subject_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Entity::find_by_id(id).one(db).await
    }

    pub async fn find_by_qr_token<C>(db: &C, token: &str) -> Result<Option<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::QrToken.eq(token))
            .one(db)
            .await
    }

    /// A token without a recorded expiry is treated as already expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.qr_expires_at {
            Some(expires_at) => expires_at < now,
            None => true,
        }
    }

    /// Start instant of the session; a missing time means midnight.
    pub fn starts_at(&self, offset: FixedOffset) -> DateTime<Utc> {
        let naive = self
            .session_date
            .and_time(self.session_time.unwrap_or(NaiveTime::MIN));
        offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc())
    }

    pub fn late_threshold(&self, offset: FixedOffset) -> DateTime<Utc> {
        self.starts_at(offset) + Duration::minutes(i64::from(self.allow_late_after_minutes))
    }

    /// Status a check-in at `now` would receive. Strictly after the threshold is
    /// late; the threshold instant itself still counts as present.
    pub fn classify_at(&self, now: DateTime<Utc>, offset: FixedOffset) -> AttendanceStatus {
        if now > self.late_threshold(offset) {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        }
    }
}
