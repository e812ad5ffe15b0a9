use api::{middleware::log_request, routes::routes};
use axum::{Router, middleware::from_fn};
use migration::{Migrator, MigratorTrait};
use std::{net::SocketAddr, process::ExitCode};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_appender::rolling;
use util::{config, state::AppState};

#[tokio::main]
async fn main() -> ExitCode {
    let _log_guard = init_logging(&config::log_file());

    let db = match db::connect().await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, path = %config::database_path(), "Failed to open database");
            return ExitCode::FAILURE;
        }
    };

    // Bring the schema up to date before accepting traffic.
    if let Err(e) = Migrator::up(&db, None).await {
        error!(error = %e, "Failed to apply migrations");
        return ExitCode::FAILURE;
    }

    let app_state = AppState::new(db);

    let app = Router::new()
        .nest("/api", routes(app_state))
        .layer(from_fn(log_request))
        .layer(CorsLayer::very_permissive());

    let addr = format!("{}:{}", config::host(), config::port());
    let addr: SocketAddr = match addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, %addr, "Invalid HOST/PORT");
            return ExitCode::FAILURE;
        }
    };

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(
        project = %config::project_name(),
        env = %config::env(),
        "Starting on http://{addr}"
    );

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!(error = %e, "Server crashed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn init_logging(log_file: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(true);

    let env_filter = EnvFilter::try_new(config::log_level())
        .unwrap_or_else(|_| EnvFilter::new("api=info,db=info"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if config::log_to_stdout() {
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
