use crate::seed::Seeder;
use crate::seeds::{INSTRUCTOR_EMAIL, OUTSIDER_EMAIL, SECTION_NAME, SUBJECT_CODE};
use db::models::{
    section, subject, subject_student,
    user::{self, UserRole},
};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

pub struct SubjectSeeder;

#[async_trait::async_trait]
impl Seeder for SubjectSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let section = section::Entity::find()
            .filter(section::Column::Name.eq(SECTION_NAME))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("section {SECTION_NAME}")))?;
        let instructor = user::Entity::find()
            .filter(user::Column::Email.eq(INSTRUCTOR_EMAIL))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("user {INSTRUCTOR_EMAIL}")))?;

        let math = subject::Model::create(
            db,
            section.id,
            Some(instructor.id),
            SUBJECT_CODE,
            "General Mathematics",
        )
        .await?;
        let science = subject::Model::create(
            db,
            section.id,
            Some(instructor.id),
            "SCI11",
            "Earth and Life Science",
        )
        .await?;

        let students = user::Entity::find()
            .filter(user::Column::Role.eq(UserRole::Student))
            .filter(user::Column::Email.ne(OUTSIDER_EMAIL))
            .all(db)
            .await?;

        for student in students {
            // Everyone takes math; roughly half take science.
            subject_student::Model::enroll(db, math.id, student.id).await?;
            if fastrand::bool() {
                subject_student::Model::enroll(db, science.id, student.id).await?;
            }
        }

        Ok(())
    }
}
