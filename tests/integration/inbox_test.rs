//! Responder inbox over HTTP.

use axum::http::StatusCode;

use crate::helpers::{TestActor, TestApp};

#[tokio::test]
async fn test_inbox_counts_and_marking() {
    let app = TestApp::new();
    let owner = TestActor::requester();
    let a = TestActor::responder();
    app.register_responder(a, "NGO A").await;

    let routine = app.create_need(owner, "need", false).await;
    let urgent = app.create_need(owner, "need", true).await;
    let routine_tickets = app.dispatch(owner, &routine, &[a]).await;
    app.dispatch(owner, &urgent, &[a]).await;

    let (status, body) = app.get("/api/inbox", a).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["need_id"], urgent.as_str());
    assert_eq!(items[0]["status"], "new");

    let (_, body) = app.get("/api/inbox/unread-count", a).await;
    assert_eq!(body["data"]["unread"], 2);
    assert_eq!(body["data"]["emergency_unread"], 1);

    let (status, body) = app
        .post_empty(&format!("/api/inbox/{urgent}/read"), a)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["changed"], true);

    app.post_empty(&format!("/api/tickets/{}/accept", routine_tickets[0]), a)
        .await;
    let (_, body) = app.get("/api/inbox", a).await;
    let routine_record = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["need_id"] == routine.as_str())
        .cloned()
        .unwrap();
    assert_eq!(routine_record["status"], "accepted");

    let (_, body) = app.post_empty("/api/inbox/read-all", a).await;
    assert_eq!(body["data"]["marked"], 1);

    let (status, _) = app.get("/api/inbox", owner).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
