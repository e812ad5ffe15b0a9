use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, DatabaseConnection, DbErr};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "grade_levels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub semester_id: i64,
    /// e.g. "Grade 11"
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::semester::Entity",
        from = "Column::SemesterId",
        to = "super::semester::Column::Id"
    )]
    Semester,
    #[sea_orm(has_many = "super::section::Entity")]
    Sections,
}

impl Related<super::semester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Semester.def()
    }
}

impl Related<super::section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(db: &DatabaseConnection, semester_id: i64, name: &str) -> Result<Self, DbErr> {
        ActiveModel {
            semester_id: Set(semester_id),
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(db)
        .await
    }
}
