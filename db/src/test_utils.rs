use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::models::{
    attendance_session, grade_level, school_year, section, semester, subject, subject_student,
    user::{self, UserRole},
};

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// A subject with its full school hierarchy, an instructor, an enrolled
/// student, a student who is not enrolled and one session on
/// 2024-01-10 09:00 with a 15 minute grace period.
pub struct AttendanceFixture {
    pub instructor: user::Model,
    pub student: user::Model,
    pub outsider: user::Model,
    pub subject: subject::Model,
    pub session: attendance_session::Model,
}

pub fn session_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date")
}

pub fn session_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).expect("valid time")
}

/// `minutes` after the fixture session starts, in UTC.
pub fn at_minute(minutes: i64) -> DateTime<Utc> {
    session_date().and_time(session_time()).and_utc() + Duration::minutes(minutes)
}

pub async fn seed_attendance_fixture(db: &DatabaseConnection) -> AttendanceFixture {
    let year = school_year::Model::create(db, "2023-2024", true)
        .await
        .expect("create school year");
    let sem = semester::Model::create(db, year.id, "Second Semester")
        .await
        .expect("create semester");
    let grade = grade_level::Model::create(db, sem.id, "Grade 11")
        .await
        .expect("create grade level");
    let sec = section::Model::create(db, grade.id, "Rizal")
        .await
        .expect("create section");

    let instructor = user::Model::create(db, "instructor@present.test", "Ana Instructor", UserRole::Instructor)
        .await
        .expect("create instructor");
    let student = user::Model::create(db, "student@present.test", "Ben Student", UserRole::Student)
        .await
        .expect("create student");
    let outsider = user::Model::create(db, "outsider@present.test", "Cy Outsider", UserRole::Student)
        .await
        .expect("create outsider");

    let subject = subject::Model::create(db, sec.id, Some(instructor.id), "MATH11", "General Mathematics")
        .await
        .expect("create subject");
    subject_student::Model::enroll(db, subject.id, student.id)
        .await
        .expect("enroll student");

    let session = attendance_session::Model::create(
        db,
        subject.id,
        session_date(),
        Some(session_time()),
        Some(15),
    )
    .await
    .expect("create session");

    AttendanceFixture {
        instructor,
        student,
        outsider,
        subject,
        session,
    }
}
