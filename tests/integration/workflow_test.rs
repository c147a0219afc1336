//! Full ticket workflow over HTTP.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{TestActor, TestApp, slot};

#[tokio::test]
async fn test_need_to_completion_over_http() {
    let app = TestApp::new();
    let owner = TestActor::requester();
    let a = TestActor::responder();
    let b = TestActor::responder();
    app.register_responder(a, "NGO A").await;
    app.register_responder(b, "NGO B").await;

    let need_id = app.create_need(owner, "need", false).await;
    let tickets = app.dispatch(owner, &need_id, &[a, b]).await;
    assert_eq!(tickets.len(), 2);
    let (ticket_a, ticket_b) = (&tickets[0], &tickets[1]);

    let need_uri = format!("/api/needs/{need_id}");
    let (_, body) = app.get(&need_uri, owner).await;
    assert_eq!(body["data"]["status"], "submitted");

    let (status, body) = app
        .post_empty(&format!("/api/tickets/{ticket_a}/accept"), a)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "accepted");
    assert_eq!(app.get(&need_uri, owner).await.1["data"]["status"], "accepted");

    let (status, body) = app
        .post(&format!("/api/tickets/{ticket_a}/schedule"), a, slot())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ticket"]["status"], "scheduled");
    assert!(body["data"]["pickup"].is_null());

    let (status, body) = app
        .post_empty(&format!("/api/tickets/{ticket_a}/complete"), a)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "INVALID_TRANSITION");

    let (status, body) = app
        .post_empty(&format!("/api/tickets/{ticket_a}/confirm"), owner)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["requester_confirmed"], true);
    assert_eq!(body["data"]["status"], "scheduled");

    let (status, _) = app
        .post_empty(&format!("/api/tickets/{ticket_a}/complete"), a)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post_empty(&format!("/api/tickets/{ticket_b}/reject"), b)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get(&need_uri, owner).await;
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["tickets"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .post(
            &format!("/api/tickets/{ticket_a}/feedback"),
            owner,
            json!({ "rating": 5, "comment": "Arrived within the hour" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["feedback"]["rating"], 5);

    let (status, body) = app
        .post(
            &format!("/api/tickets/{ticket_a}/feedback"),
            owner,
            json!({ "rating": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DUPLICATE_ACTION");

    let (status, body) = app
        .get(&format!("/api/scores/responder/{}", a.id), owner)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["points"], 120);
    assert_eq!(body["data"]["badges"], json!(["Bronze"]));

    let (_, body) = app
        .get(&format!("/api/scores/requester/{}", owner.id), owner)
        .await;
    assert_eq!(body["data"]["points"], 10);
}

#[tokio::test]
async fn test_donation_pickup_over_http() {
    let app = TestApp::new();
    let donor = TestActor::requester();
    let a = TestActor::responder();
    app.register_responder(a, "Food bank").await;

    let offer_id = app.create_need(donor, "offer", false).await;
    let tickets = app.dispatch(donor, &offer_id, &[a]).await;
    let ticket = &tickets[0];

    app.post_empty(&format!("/api/tickets/{ticket}/accept"), a)
        .await;
    let (status, body) = app
        .post(&format!("/api/tickets/{ticket}/schedule"), a, slot())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pickup"]["status"], "scheduled");

    let (status, body) = app
        .post_empty(&format!("/api/tickets/{ticket}/pickup/start"), a)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");

    let (status, body) = app
        .post(
            &format!("/api/tickets/{ticket}/pickup/deliver"),
            a,
            json!({ "proof_images": ["proof/1.jpg"], "notes": "Handed to the shelter" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");

    let (_, body) = app.get(&format!("/api/tickets/{ticket}"), donor).await;
    assert_eq!(body["data"]["ticket"]["status"], "scheduled");
    assert_eq!(body["data"]["pickup"]["status"], "completed");
}

#[tokio::test]
async fn test_nearest_responders() {
    let app = TestApp::new();
    let a = TestActor::responder();
    app.register_responder(a, "NGO A").await;

    let (status, body) = app
        .get("/api/responders/nearest?lat=19.0&lon=72.8&limit=5&category=food", a)
        .await;
    assert_eq!(status, StatusCode::OK);
    let found = body["data"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["responder"]["name"], "NGO A");
    assert!(found[0]["distance_km"].as_f64().unwrap() > 0.0);

    let (status, _) = app
        .get("/api/responders/nearest?lat=19.0&lon=72.8&limit=0", a)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
