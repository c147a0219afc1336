//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use aidbridge_api::{AppState, build_app};
use aidbridge_core::config::AppConfig;
use aidbridge_database::Store;
use aidbridge_service::PushDispatcher;

/// An actor as the gateway would present it.
#[derive(Debug, Clone, Copy)]
pub struct TestActor {
    pub id: Uuid,
    pub role: &'static str,
}

impl TestActor {
    pub fn requester() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: "requester",
        }
    }

    pub fn responder() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: "responder",
        }
    }
}

/// Router over a fresh in-memory store.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.scoring.completion_points = 120;
        let state = AppState::new(config, Store::memory(), PushDispatcher::disabled());
        Self {
            router: build_app(state),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        actor: Option<TestActor>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder
                .header("x-actor-id", actor.id.to_string())
                .header("x-actor-role", actor.role);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, actor: TestActor) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(actor), None).await
    }

    pub async fn post(&self, uri: &str, actor: TestActor, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(actor), Some(body)).await
    }

    pub async fn post_empty(&self, uri: &str, actor: TestActor) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(actor), None).await
    }

    /// Register a responder organization for `actor`.
    pub async fn register_responder(&self, actor: TestActor, name: &str) {
        let (status, _) = self
            .post(
                "/api/responders",
                actor,
                json!({
                    "name": name,
                    "categories": ["food"],
                    "location": { "latitude": 19.08, "longitude": 72.88 },
                    "contact_email": "ops@example.org"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    /// Create a need and return its id.
    pub async fn create_need(&self, actor: TestActor, kind: &str, emergency: bool) -> String {
        let (status, body) = self
            .post(
                "/api/needs",
                actor,
                json!({
                    "kind": kind,
                    "category": "food",
                    "description": "Dry rations for a flooded street",
                    "location": { "latitude": 19.076, "longitude": 72.8777 },
                    "emergency": emergency
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Dispatch `need_id` to `responders` and return the created ticket ids in order.
    pub async fn dispatch(
        &self,
        owner: TestActor,
        need_id: &str,
        responders: &[TestActor],
    ) -> Vec<String> {
        let ids: Vec<String> = responders.iter().map(|r| r.id.to_string()).collect();
        let (status, body) = self
            .post(
                &format!("/api/needs/{need_id}/dispatch"),
                owner,
                json!({ "responder_ids": ids }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["created"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap().to_string())
            .collect()
    }
}

pub fn slot() -> Value {
    json!({
        "volunteer_name": "V",
        "volunteer_contact": "9999999999",
        "date": "2025-01-10",
        "time": "10:00"
    })
}
