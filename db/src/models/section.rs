use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, DatabaseConnection, DbErr};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub grade_level_id: i64,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::grade_level::Entity",
        from = "Column::GradeLevelId",
        to = "super::grade_level::Column::Id"
    )]
    GradeLevel,
    #[sea_orm(has_many = "super::subject::Entity")]
    Subjects,
}

impl Related<super::grade_level::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeLevel.def()
    }
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subjects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(db: &DatabaseConnection, grade_level_id: i64, name: &str) -> Result<Self, DbErr> {
        ActiveModel {
            grade_level_id: Set(grade_level_id),
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(db)
        .await
    }
}
