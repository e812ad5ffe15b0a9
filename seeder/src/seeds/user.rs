use crate::seed::Seeder;
use crate::seeds::{INSTRUCTOR_EMAIL, OUTSIDER_EMAIL, STUDENT_EMAIL};
use db::models::user::{Model, UserRole};
use fake::{
    Fake,
    faker::{internet::en::SafeEmail, name::en::Name},
};
use sea_orm::{DatabaseConnection, DbErr};

pub struct UserSeeder;

#[async_trait::async_trait]
impl Seeder for UserSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        Model::create(db, "admin@present.test", "Site Admin", UserRole::Admin).await?;
        Model::create(db, INSTRUCTOR_EMAIL, "Ana Instructor", UserRole::Instructor).await?;
        Model::create(db, STUDENT_EMAIL, "Ben Student", UserRole::Student).await?;
        Model::create(db, OUTSIDER_EMAIL, "Cy Outsider", UserRole::Student).await?;

        // Random students; some get enrolled by the subject seeder.
        for i in 0..10 {
            let name: String = Name().fake();
            let email: String = SafeEmail().fake();
            // Prefix keeps generated emails unique.
            Model::create(db, &format!("s{i:02}.{email}"), &name, UserRole::Student).await?;
        }

        Ok(())
    }
}
