use crate::seed::{Seeder, run_seeder};
use crate::seeds::{
    attendance::AttendanceSeeder, school::SchoolSeeder, subject::SubjectSeeder, user::UserSeeder,
};
use colored::*;
use std::process::ExitCode;

mod seed;
mod seeds;

/// Fills a freshly migrated database with a small school: one active school
/// year, a section with two subjects, an instructor, enrolled students, one
/// student outside every subject and two math sessions.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let db = match db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{} {e}", "Could not open database:".red());
            return ExitCode::FAILURE;
        }
    };

    for (seeder, name) in [
        (Box::new(SchoolSeeder) as Box<dyn Seeder + Send + Sync>, "School"),
        (Box::new(UserSeeder), "User"),
        (Box::new(SubjectSeeder), "Subject"),
        (Box::new(AttendanceSeeder), "Attendance"),
    ] {
        if !run_seeder(&*seeder, name, &db).await {
            return ExitCode::FAILURE;
        }
    }

    println!(
        "Seeded {} (run `cargo run -p migration -- fresh` first on an existing database)",
        util::config::database_path().bold()
    );
    ExitCode::SUCCESS
}
