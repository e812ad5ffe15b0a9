use std::env;
use tempfile::TempDir;

/// Creates a unique temporary directory and points `DATABASE_PATH` at a
/// database file nested one level below it, so callers also exercise parent
/// directory creation. The directory is removed when the returned `TempDir`
/// is dropped.
///
/// Keep the returned `TempDir` in scope for as long as you need the database.
pub fn setup_test_database_path() -> (TempDir, String) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let abs = tmp
        .path()
        .canonicalize()
        .unwrap_or_else(|_| tmp.path().to_path_buf());
    let db_path = abs.join("nested").join("present.db");
    let db_path = db_path.to_string_lossy().to_string();
    unsafe {
        env::set_var("DATABASE_PATH", &db_path);
    }
    (tmp, db_path)
}
