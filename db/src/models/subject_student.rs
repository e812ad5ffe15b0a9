use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr, PaginatorTrait, QueryFilter};
use serde::Serialize;

/// Enrollment of a student in a subject's roster.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "subject_students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub subject_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id"
    )]
    Subject,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Adds the student to the subject roster. Enrolling twice is a no-op.
    pub async fn enroll<C>(db: &C, subject_id: i64, student_id: i64) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::insert(ActiveModel {
            subject_id: Set(subject_id),
            student_id: Set(student_id),
        })
        .on_conflict(
            OnConflict::columns([Column::SubjectId, Column::StudentId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
        Ok(())
    }

    pub async fn is_enrolled<C>(db: &C, subject_id: i64, student_id: i64) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let count = Entity::find()
            .filter(Column::SubjectId.eq(subject_id))
            .filter(Column::StudentId.eq(student_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }
}
