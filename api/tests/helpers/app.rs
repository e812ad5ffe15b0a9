use api::{middleware::log_request, routes::routes};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use util::state::AppState;

/// Full `/api` router over a fresh in-memory database with migrations applied.
pub async fn make_test_app() -> (Router, DatabaseConnection) {
    let db = db::test_utils::setup_test_db().await;

    let app = Router::new()
        .nest("/api", routes(AppState::new(db.clone())))
        .layer(from_fn(log_request));

    (app, db)
}

/// Sends `req` and decodes the JSON body (`Value::Null` when empty).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}
