pub mod attendance;
pub mod models;
pub mod test_utils;


use sea_orm::{Database, DatabaseConnection, DbErr};
use std::path::Path;
use util::config;

/// Opens the configured database.
///
/// `DATABASE_PATH` may be a full DSN or a plain SQLite file path; for a file
/// path the parent directory is created first since SQLite will not.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let path_or_url = config::database_path();
    Database::connect(&database_url(&path_or_url)).await
}

fn database_url(path_or_url: &str) -> String {
    if path_or_url.starts_with("sqlite:") {
        return path_or_url.to_string();
    }

    if let Some(parent) = Path::new(path_or_url).parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!(error = %e, path = %parent.display(), "Could not create database directory");
        }
    }
    format!("sqlite://{path_or_url}?mode=rwc")
}
