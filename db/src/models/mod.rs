pub mod attendance_record;
pub mod attendance_session;
pub mod grade_level;
pub mod school_year;
pub mod section;
pub mod semester;
pub mod subject;
pub mod subject_student;
pub mod user;

pub use attendance_record::Entity as AttendanceRecord;
pub use attendance_session::Entity as AttendanceSession;
pub use grade_level::Entity as GradeLevel;
pub use school_year::Entity as SchoolYear;
pub use section::Entity as Section;
pub use semester::Entity as Semester;
pub use subject::Entity as Subject;
pub use subject_student::Entity as SubjectStudent;
pub use user::Entity as User;
