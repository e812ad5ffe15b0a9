use crate::seed::Seeder;
use crate::seeds::SECTION_NAME;
use db::models::{grade_level, school_year, section, semester};
use sea_orm::{DatabaseConnection, DbErr};

pub struct SchoolSeeder;

#[async_trait::async_trait]
impl Seeder for SchoolSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let previous = school_year::Model::create(db, "2024-2025", false).await?;
        semester::Model::create(db, previous.id, "First Semester").await?;

        let year = school_year::Model::create(db, "2025-2026", true).await?;
        let first = semester::Model::create(db, year.id, "First Semester").await?;
        semester::Model::create(db, year.id, "Second Semester").await?;

        let grade = grade_level::Model::create(db, first.id, "Grade 11").await?;
        section::Model::create(db, grade.id, SECTION_NAME).await?;
        section::Model::create(db, grade.id, "Bonifacio").await?;

        Ok(())
    }
}
