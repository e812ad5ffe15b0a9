pub mod attendance;
pub mod school;
pub mod subject;
pub mod user;

/// Fixed accounts and names shared between seeders.
pub const INSTRUCTOR_EMAIL: &str = "instructor@present.test";
pub const STUDENT_EMAIL: &str = "student@present.test";
pub const OUTSIDER_EMAIL: &str = "outsider@present.test";
pub const SECTION_NAME: &str = "Rizal";
pub const SUBJECT_CODE: &str = "MATH11";
