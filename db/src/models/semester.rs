use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, DatabaseConnection, DbErr};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "semesters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub school_year_id: i64,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::school_year::Entity",
        from = "Column::SchoolYearId",
        to = "super::school_year::Column::Id"
    )]
    SchoolYear,
    #[sea_orm(has_many = "super::grade_level::Entity")]
    GradeLevels,
}

impl Related<super::school_year::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SchoolYear.def()
    }
}

impl Related<super::grade_level::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeLevels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(db: &DatabaseConnection, school_year_id: i64, name: &str) -> Result<Self, DbErr> {
        ActiveModel {
            school_year_id: Set(school_year_id),
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(db)
        .await
    }
}
