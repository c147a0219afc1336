//! Error mapping and actor extraction.

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use crate::helpers::{TestActor, TestApp};

#[tokio::test]
async fn test_health_needs_no_actor() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["backend"], "memory");
}

#[tokio::test]
async fn test_missing_actor_is_forbidden() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/needs", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_unknown_role_is_rejected() {
    let app = TestApp::new();
    let actor = TestActor {
        id: Uuid::new_v4(),
        role: "admin",
    };
    let (status, body) = app.get("/api/needs", actor).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_role_and_ownership_checks() {
    let app = TestApp::new();
    let owner = TestActor::requester();
    let a = TestActor::responder();
    app.register_responder(a, "NGO A").await;

    let (status, _) = app
        .post(
            "/api/needs",
            a,
            json!({
                "category": "food",
                "description": "Responders cannot post needs",
                "location": { "latitude": 1.0, "longitude": 1.0 }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let need_id = app.create_need(owner, "need", false).await;
    let (status, _) = app
        .get(&format!("/api/needs/{need_id}"), TestActor::requester())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let tickets = app.dispatch(owner, &need_id, &[a]).await;
    let (status, body) = app
        .post_empty(
            &format!("/api/tickets/{}/accept", tickets[0]),
            TestActor::responder(),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_validation_and_not_found() {
    let app = TestApp::new();
    let owner = TestActor::requester();
    let a = TestActor::responder();
    app.register_responder(a, "NGO A").await;

    let (status, body) = app
        .post(
            "/api/needs",
            owner,
            json!({
                "category": "",
                "description": "x",
                "location": { "latitude": 1.0, "longitude": 1.0 }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, body) = app
        .post(
            &format!("/api/needs/{}/dispatch", Uuid::new_v4()),
            owner,
            json!({ "responder_ids": [a.id] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let need_id = app.create_need(owner, "need", false).await;
    let (status, _) = app
        .post(
            &format!("/api/needs/{need_id}/dispatch"),
            owner,
            json!({ "responder_ids": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let tickets = app.dispatch(owner, &need_id, &[a]).await;
    app.post_empty(&format!("/api/tickets/{}/accept", tickets[0]), a)
        .await;
    let (status, body) = app
        .post(
            &format!("/api/tickets/{}/schedule", tickets[0]),
            a,
            json!({ "volunteer_name": "V", "date": "2025-01-10" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("volunteer_contact"));
}

#[tokio::test]
async fn test_repeat_dispatch_reports_existing() {
    let app = TestApp::new();
    let owner = TestActor::requester();
    let a = TestActor::responder();
    app.register_responder(a, "NGO A").await;
    let need_id = app.create_need(owner, "need", false).await;

    app.dispatch(owner, &need_id, &[a]).await;
    let (status, body) = app
        .post(
            &format!("/api/needs/{need_id}/dispatch"),
            owner,
            json!({ "responder_ids": [a.id] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["created"].as_array().unwrap().is_empty());
    assert_eq!(body["data"]["already_dispatched"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_schedule_body_uses_error_envelope() {
    let app = TestApp::new();
    let owner = TestActor::requester();
    let a = TestActor::responder();
    app.register_responder(a, "NGO A").await;
    let need_id = app.create_need(owner, "need", false).await;
    let tickets = app.dispatch(owner, &need_id, &[a]).await;
    app.post_empty(&format!("/api/tickets/{}/accept", tickets[0]), a)
        .await;

    for action in ["schedule", "reschedule"] {
        let (status, body) = app
            .post(
                &format!("/api/tickets/{}/{action}", tickets[0]),
                a,
                json!({
                    "volunteer_name": 5,
                    "volunteer_contact": "9999999999",
                    "date": "2025-01-10",
                    "time": "10:00"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    let (status, body) = app
        .post(
            &format!("/api/tickets/{}/schedule", tickets[0]),
            TestActor::responder(),
            json!({ "volunteer_name": "V" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}
