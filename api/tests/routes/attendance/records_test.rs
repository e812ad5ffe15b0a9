#[cfg(test)]
mod tests {
    use crate::helpers::{make_test_app, send};
    use axum::{
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };
    use db::test_utils::seed_attendance_fixture;
    use serde_json::{Value, json};

    fn put_records(session_id: i64, body: Value) -> Request<AxumBody> {
        Request::builder()
            .method("PUT")
            .uri(format!("/api/attendance/sessions/{session_id}/records"))
            .header("content-type", "application/json")
            .body(AxumBody::from(body.to_string()))
            .unwrap()
    }

    fn get_records(session_id: i64) -> Request<AxumBody> {
        Request::builder()
            .method("GET")
            .uri(format!("/api/attendance/sessions/{session_id}/records"))
            .body(AxumBody::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn bulk_update_then_list() {
        let (app, db) = make_test_app().await;
        let fx = seed_attendance_fixture(&db).await;

        let (status, json) = send(
            &app,
            put_records(
                fx.session.id,
                json!({ "records": [{ "studentId": fx.student.id, "status": "excused" }] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "sessionId": fx.session.id, "updated": 1 }));

        let (status, json) = send(&app, get_records(fx.session.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sessionId"], fx.session.id);
        let records = json["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["studentId"], fx.student.id);
        assert_eq!(records[0]["studentName"], "Ben Student");
        assert_eq!(records[0]["status"], "excused");
    }

    #[tokio::test]
    async fn absent_record_is_overwritten_by_scan() {
        let (app, db) = make_test_app().await;
        let fx = seed_attendance_fixture(&db).await;

        let (status, _) = send(
            &app,
            put_records(
                fx.session.id,
                json!({ "records": [{ "studentId": fx.student.id, "status": "absent" }] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let issue = Request::builder()
            .method("POST")
            .uri("/api/attendance/qr")
            .header("content-type", "application/json")
            .body(AxumBody::from(
                json!({ "sessionId": fx.session.id, "subjectId": fx.subject.id }).to_string(),
            ))
            .unwrap();
        let (_, issued) = send(&app, issue).await;

        let scan = Request::builder()
            .method("PUT")
            .uri("/api/attendance/qr")
            .header("content-type", "application/json")
            .body(AxumBody::from(
                json!({ "token": issued["token"], "studentId": fx.student.id }).to_string(),
            ))
            .unwrap();
        let (status, json) = send(&app, scan).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "late");
        assert!(json.get("alreadyMarked").is_none());

        let (_, json) = send(&app, get_records(fx.session.id)).await;
        let records = json["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["status"], "late");
    }

    #[tokio::test]
    async fn bulk_update_rejects_bad_input() {
        let (app, db) = make_test_app().await;
        let fx = seed_attendance_fixture(&db).await;

        let (status, json) = send(&app, put_records(fx.session.id, json!({ "records": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "records must not be empty");

        let (status, json) = send(
            &app,
            put_records(
                fx.session.id,
                json!({ "records": [{ "studentId": fx.student.id, "status": "tardy" }] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Unknown attendance status 'tardy'");

        let (status, json) = send(
            &app,
            put_records(
                fx.session.id,
                json!({ "records": [{ "studentId": fx.outsider.id, "status": "absent" }] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            format!("Student {} is not enrolled in this subject", fx.outsider.id)
        );
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (app, db) = make_test_app().await;
        let fx = seed_attendance_fixture(&db).await;

        let (status, _) = send(&app, get_records(fx.session.id + 100)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = send(
            &app,
            put_records(
                fx.session.id + 100,
                json!({ "records": [{ "studentId": fx.student.id, "status": "absent" }] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Attendance session not found");
    }
}
