#[cfg(test)]
mod tests {
    use crate::helpers::{make_test_app, send};
    use axum::{
        Router,
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };
    use chrono::{DateTime, Duration, Utc};
    use db::models::{attendance_record, attendance_session};
    use db::test_utils::{AttendanceFixture, seed_attendance_fixture};
    use sea_orm::{
        ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, IntoActiveModel,
        PaginatorTrait,
    };
    use serde_json::{Value, json};
    use serial_test::serial;
    use util::config::AppConfig;

    struct TestData {
        app: Router,
        db: DatabaseConnection,
        fx: AttendanceFixture,
    }

    async fn setup() -> TestData {
        let (app, db) = make_test_app().await;
        let fx = seed_attendance_fixture(&db).await;
        TestData { app, db, fx }
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<AxumBody> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(AxumBody::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<AxumBody> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(AxumBody::empty())
            .unwrap()
    }

    async fn issue_token(data: &TestData, session_id: i64) -> String {
        let (status, json) = send(
            &data.app,
            json_request(
                "POST",
                "/api/attendance/qr",
                json!({ "sessionId": session_id, "subjectId": data.fx.subject.id }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        json["token"].as_str().unwrap().to_owned()
    }

    /// A session for the fixture subject that starts tomorrow, so a scan now is on time.
    async fn upcoming_session(data: &TestData) -> attendance_session::Model {
        let tomorrow = Utc::now().date_naive() + Duration::days(1);
        attendance_session::Model::create(&data.db, data.fx.subject.id, tomorrow, None, Some(15))
            .await
            .unwrap()
    }

    async fn record_count(db: &DatabaseConnection) -> u64 {
        attendance_record::Entity::find().count(db).await.unwrap()
    }

    #[tokio::test]
    async fn issue_returns_token_url_and_expiry() {
        let data = setup().await;
        let before = Utc::now();

        let (status, json) = send(
            &data.app,
            json_request(
                "POST",
                "/api/attendance/qr",
                json!({
                    "sessionId": data.fx.session.id,
                    "subjectId": data.fx.subject.id,
                    "expiresInMinutes": 60,
                    "lateAfterMinutes": 10
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let token = json["token"].as_str().unwrap();
        assert_eq!(token.len(), 64);
        assert!(
            json["qrUrl"]
                .as_str()
                .unwrap()
                .ends_with(&format!("/attendance/scan?token={token}"))
        );
        assert_eq!(json["lateAfterMinutes"], 10);

        let expires_at: DateTime<Utc> = json["expiresAt"].as_str().unwrap().parse().unwrap();
        let delta = expires_at - before;
        assert!(delta >= Duration::minutes(59) && delta <= Duration::minutes(61));
    }

    #[tokio::test]
    #[serial]
    async fn qr_url_uses_configured_base_url() {
        let data = setup().await;
        AppConfig::set_app_base_url("https://school.example/present/");

        let (status, json) = send(
            &data.app,
            json_request(
                "POST",
                "/api/attendance/qr",
                json!({ "sessionId": data.fx.session.id, "subjectId": data.fx.subject.id }),
            ),
        )
        .await;
        AppConfig::reset();

        assert_eq!(status, StatusCode::OK);
        let token = json["token"].as_str().unwrap();
        assert_eq!(
            json["qrUrl"],
            format!("https://school.example/present/attendance/scan?token={token}")
        );
        assert_eq!(json["lateAfterMinutes"], 15);
    }

    #[tokio::test]
    async fn issue_requires_both_ids() {
        let data = setup().await;

        let (status, json) = send(
            &data.app,
            json_request("POST", "/api/attendance/qr", json!({ "sessionId": data.fx.session.id })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "sessionId and subjectId are required");
    }

    #[tokio::test]
    async fn issue_with_huge_expiry_is_a_validation_error() {
        let data = setup().await;

        let (status, json) = send(
            &data.app,
            json_request(
                "POST",
                "/api/attendance/qr",
                json!({
                    "sessionId": data.fx.session.id,
                    "subjectId": data.fx.subject.id,
                    "expiresInMinutes": i64::MAX
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("expiresInMinutes"));
    }

    #[tokio::test]
    async fn issue_with_mismatched_subject_is_not_found() {
        let data = setup().await;

        let (status, json) = send(
            &data.app,
            json_request(
                "POST",
                "/api/attendance/qr",
                json!({ "sessionId": data.fx.session.id, "subjectId": data.fx.subject.id + 1 }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Attendance session not found");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let data = setup().await;

        let req = Request::builder()
            .method("PUT")
            .uri("/api/attendance/qr")
            .header("content-type", "application/json")
            .body(AxumBody::from("{not json"))
            .unwrap();
        let (status, json) = send(&data.app, req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn preview_requires_token() {
        let data = setup().await;

        let (status, json) = send(&data.app, get("/api/attendance/qr")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "token is required");

        let (status, _) = send(&data.app, get("/api/attendance/qr?token=%20")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn preview_unknown_token_is_not_found() {
        let data = setup().await;

        let (status, json) = send(&data.app, get("/api/attendance/qr?token=nope")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Invalid or expired QR code");
    }

    #[tokio::test]
    async fn preview_shows_context_without_writing() {
        let data = setup().await;
        let token = issue_token(&data, data.fx.session.id).await;

        let (status, json) = send(&data.app, get(&format!("/api/attendance/qr?token={token}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sessionId"], data.fx.session.id);
        assert_eq!(json["subjectName"], "General Mathematics");
        assert_eq!(json["subjectCode"], "MATH11");
        assert_eq!(json["sectionName"], "Rizal");
        assert_eq!(json["gradeLevel"], "Grade 11");
        assert_eq!(json["semester"], "Second Semester");
        assert_eq!(json["schoolYear"], "2023-2024");
        assert_eq!(json["sessionDate"], "2024-01-10");
        assert_eq!(json["sessionTime"], "09:00:00");
        // The fixture session is long past.
        assert_eq!(json["willBeMarkedAs"], "late");
        assert!(json["expiresAt"].is_string());
        assert!(json.get("qrToken").is_none());

        assert_eq!(record_count(&data.db).await, 0);
    }

    #[tokio::test]
    async fn expired_token_is_gone_for_preview_and_check_in() {
        let data = setup().await;
        let token = issue_token(&data, data.fx.session.id).await;

        let mut session = attendance_session::Entity::find_by_id(data.fx.session.id)
            .one(&data.db)
            .await
            .unwrap()
            .unwrap()
            .into_active_model();
        session.qr_expires_at = Set(Some(Utc::now() - Duration::minutes(1)));
        session.update(&data.db).await.unwrap();

        let (status, json) = send(&data.app, get(&format!("/api/attendance/qr?token={token}"))).await;
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(json["error"], "QR code has expired");

        for student_id in [data.fx.student.id, data.fx.outsider.id] {
            let (status, _) = send(
                &data.app,
                json_request(
                    "PUT",
                    "/api/attendance/qr",
                    json!({ "token": token, "studentId": student_id }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::GONE);
        }
        assert_eq!(record_count(&data.db).await, 0);
    }

    #[tokio::test]
    async fn check_in_requires_token_and_student() {
        let data = setup().await;

        let (status, json) = send(
            &data.app,
            json_request("PUT", "/api/attendance/qr", json!({ "token": "abc" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "token and studentId are required");
    }

    #[tokio::test]
    async fn check_in_by_student_outside_subject_is_forbidden() {
        let data = setup().await;
        let token = issue_token(&data, data.fx.session.id).await;

        let (status, json) = send(
            &data.app,
            json_request(
                "PUT",
                "/api/attendance/qr",
                json!({ "token": token, "studentId": data.fx.outsider.id }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "You are not enrolled in this subject");
        assert_eq!(record_count(&data.db).await, 0);
    }

    #[tokio::test]
    async fn check_in_then_rescan_reports_already_marked() {
        let data = setup().await;
        let session = upcoming_session(&data).await;
        let token = issue_token(&data, session.id).await;
        let body = json!({ "token": token, "studentId": data.fx.student.id });

        let (status, json) = send(&data.app, json_request("PUT", "/api/attendance/qr", body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "status": "present", "sessionId": session.id }));

        let (status, json) = send(&data.app, json_request("PUT", "/api/attendance/qr", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "present");
        assert_eq!(json["alreadyMarked"], true);

        assert_eq!(record_count(&data.db).await, 1);
    }

    #[tokio::test]
    async fn check_in_after_grace_period_is_late() {
        let data = setup().await;
        let token = issue_token(&data, data.fx.session.id).await;

        let (status, json) = send(
            &data.app,
            json_request(
                "PUT",
                "/api/attendance/qr",
                json!({ "token": token, "studentId": data.fx.student.id }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "late");
        assert!(json.get("alreadyMarked").is_none());
    }

    #[tokio::test]
    async fn regenerated_token_replaces_the_old_one() {
        let data = setup().await;
        let first = issue_token(&data, data.fx.session.id).await;
        let second = issue_token(&data, data.fx.session.id).await;
        assert_ne!(first, second);

        let (status, _) = send(&data.app, get(&format!("/api/attendance/qr?token={first}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&data.app, get(&format!("/api/attendance/qr?token={second}"))).await;
        assert_eq!(status, StatusCode::OK);
    }
}
