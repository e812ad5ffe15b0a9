pub mod m202601100001_create_users;
pub mod m202601100002_create_school_structure;
pub mod m202601100003_create_subject_students;
pub mod m202601100004_create_attendance;
