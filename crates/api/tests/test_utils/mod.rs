#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use pawbook_api::{app, middleware::auth::TokenIssuer, ApiState};
use pawbook_core::ledger::{populate, SlotPlan};
use pawbook_db::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub const DAY: &str = "2024-01-01";

/// A router over a fresh in-memory store, with the default catalogue and one
/// day of half-hour slots from 09:00 to 17:00.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
}

impl TestContext {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::with_default_catalogue());
        let plan = SlotPlan {
            from_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            num_days: 1,
            start_hour: 9,
            end_hour: 17,
            slot_duration_minutes: 30,
        };
        populate(store.as_ref(), &plan).await.unwrap();

        let state = ApiState::new(store.clone(), TokenIssuer::new(b"test-secret", 24));
        Self {
            store,
            app: app(Arc::new(state)),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send(method, uri, token, body.map(|body| body.to_string()))
            .await
    }

    /// Sends `body` verbatim as `application/json`, valid or not.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        // Unmatched routes answer with an empty body; everything else is JSON
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|e| panic!("{} is not JSON: {}", String::from_utf8_lossy(&bytes), e))
        };
        (status, body)
    }

    pub async fn register(&self, email: &str, dog_name: Option<&str>) -> StatusCode {
        let mut body = json!({
            "full_name": "Test Owner",
            "email": email,
            "password": "correct horse",
        });
        if let Some(dog_name) = dog_name {
            body["dog_name"] = json!(dog_name);
            body["dog_breed"] = json!("Beagle");
            body["dog_age"] = json!(3);
        }
        self.request(Method::POST, "/auth/register", None, Some(body))
            .await
            .0
    }

    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": "correct horse" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Registers a user with one dog and returns their token and the dog id.
    pub async fn owner_with_dog(&self, email: &str) -> (String, Uuid) {
        assert_eq!(self.register(email, Some("Rex")).await, StatusCode::CREATED);
        let token = self.login(email).await;
        let (_, dogs) = self
            .request(Method::GET, "/api/profile/dogs", Some(&token), None)
            .await;
        (token, id_of(&dogs[0]))
    }

    pub async fn service_id(&self) -> Uuid {
        let (_, services) = self.request(Method::GET, "/api/services", None, None).await;
        id_of(&services[0])
    }

    pub async fn available_times(&self) -> Vec<String> {
        let (status, slots) = self
            .request(Method::GET, &format!("/api/availability?date={}", DAY), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        slots
            .as_array()
            .unwrap()
            .iter()
            .map(|slot| slot["time_slot"].as_str().unwrap().to_string())
            .collect()
    }

    pub async fn book(&self, token: &str, dog_id: Uuid, service_id: Uuid, time: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/appointments",
            Some(token),
            Some(json!({
                "dog_id": dog_id,
                "service_id": service_id,
                "date": DAY,
                "time": time,
            })),
        )
        .await
    }
}

pub fn id_of(value: &Value) -> Uuid {
    value["id"].as_str().unwrap().parse().unwrap()
}
