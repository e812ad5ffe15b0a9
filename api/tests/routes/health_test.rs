#[cfg(test)]
mod tests {
    use crate::helpers::{make_test_app, send};
    use axum::{
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };

    #[tokio::test]
    async fn health_check_returns_ok_json() {
        let (app, _db) = make_test_app().await;

        let req = Request::builder()
            .method("GET")
            .uri("/api/health")
            .body(AxumBody::empty())
            .unwrap();

        let (status, json) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], util::config::project_name());
        assert!(json["serverTime"].is_string());
    }
}
