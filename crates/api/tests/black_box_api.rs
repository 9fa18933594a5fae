use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use catalog_api::app::AppServices;
use catalog_api::app::services::InMemoryCatalogBus;
use catalog_auth::{JwtClaims, Role, Scope};
use catalog_events::{CatalogEvent, EventBus, EventEnvelope, Subscription};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    bus: Arc<InMemoryCatalogBus>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory backends, ephemeral port.
        let (services, bus) = AppServices::in_memory(64);
        let app = catalog_api::app::build_app_with(JWT_SECRET, services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, bus, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(roles: Vec<Role>, scopes: Vec<Scope>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: "tester".to_string(),
        role: roles,
        scope: scopes,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn admin_token() -> String {
    mint_jwt(vec![Role::admin()], vec![])
}

/// The relay delivers asynchronously; poll briefly for the next envelope.
async fn next_event(sub: &Subscription<EventEnvelope<CatalogEvent>>) -> EventEnvelope<CatalogEvent> {
    for _ in 0..100 {
        if let Ok(envelope) = sub.try_recv() {
            return envelope;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("no event delivered within timeout");
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn auth_required_for_item_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/items")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    let res = client
        .get(srv.url("/items"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tokens_signed_with_another_secret_are_rejected() {
    let srv = TestServer::spawn().await;
    let now = Utc::now();
    let claims = JwtClaims {
        sub: "intruder".to_string(),
        role: vec![Role::admin()],
        scope: vec![],
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    let res = reqwest::Client::new()
        .get(srv.url("/items"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn read_and_write_scopes_are_not_interchangeable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let reader = mint_jwt(vec![], vec![Scope::read_access()]);
    let writer = mint_jwt(vec![], vec![Scope::write_access()]);
    let full = mint_jwt(vec![], vec![Scope::full_access()]);

    // Reader can list but not create.
    let res = client.get(srv.url("/items")).bearer_auth(&reader).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(srv.url("/items"))
        .bearer_auth(&reader)
        .json(&json!({"name": "Sword", "description": "Basic", "price": 10.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    // Writer can create but not read.
    let res = client
        .post(srv.url("/items"))
        .bearer_auth(&writer)
        .json(&json!({"name": "Sword", "description": "Basic", "price": 10.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client.get(srv.url("/items")).bearer_auth(&writer).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Full access passes Write but not the narrower list/get policy.
    let res = client.get(srv.url("/items")).bearer_auth(&full).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_requests_are_bad_requests() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = admin_token();

    let res = client
        .get(srv.url("/items/not-a-uuid"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");

    let res = client
        .post(srv.url("/items"))
        .bearer_auth(&token)
        .json(&json!({"name": "   ", "description": "Basic", "price": 10.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = client
        .post(srv.url("/items"))
        .bearer_auth(&token)
        .json(&json!({"name": "Sword", "price": -1.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sword_lifecycle_create_update_delete() {
    let srv = TestServer::spawn().await;
    let events = srv.bus.subscribe();
    let client = reqwest::Client::new();
    let token = admin_token();

    // Create
    let res = client
        .post(srv.url("/items"))
        .bearer_auth(&token)
        .json(&json!({"name": "Sword", "description": "Basic", "price": 10.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res
        .headers()
        .get(reqwest::header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(location, format!("/items/{id}"));
    assert_eq!(created["name"], "Sword");
    assert_eq!(created["description"], "Basic");
    assert_eq!(created["price"], 10.0);
    assert!(created["createdDate"].is_string());

    let envelope = next_event(&events).await;
    assert_eq!(envelope.event_type(), "catalog.item.created");
    assert_eq!(
        serde_json::to_value(envelope.payload()).unwrap(),
        json!({"id": id, "name": "Sword", "description": "Basic", "price": 10.0})
    );

    // Read back
    let res = client.get(srv.url(&location)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched, created);

    // Update
    let res = client
        .put(srv.url(&location))
        .bearer_auth(&token)
        .json(&json!({"name": "Sword+1", "description": "Basic", "price": 15.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let envelope = next_event(&events).await;
    assert_eq!(envelope.event_type(), "catalog.item.updated");
    assert_eq!(
        serde_json::to_value(envelope.payload()).unwrap(),
        json!({"id": id, "name": "Sword+1", "description": "Basic", "price": 15.0})
    );

    let res = client.get(srv.url(&location)).bearer_auth(&token).send().await.unwrap();
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["price"], 15.0);
    assert_eq!(updated["createdDate"], created["createdDate"]);

    // Delete
    let res = client.delete(srv.url(&location)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let envelope = next_event(&events).await;
    assert_eq!(envelope.event_type(), "catalog.item.deleted");
    assert_eq!(serde_json::to_value(envelope.payload()).unwrap(), json!({"id": id}));

    // Gone
    let res = client.get(srv.url(&location)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = client.delete(srv.url(&location)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Exactly one event per successful mutation.
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn updating_a_missing_item_is_not_found() {
    let srv = TestServer::spawn().await;
    let events = srv.bus.subscribe();

    let res = reqwest::Client::new()
        .put(srv.url("/items/0190b6c8-3f5e-7b5a-9c1d-2e3f4a5b6c7d"))
        .bearer_auth(admin_token())
        .json(&json!({"name": "Ghost", "description": "", "price": 1.0}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn caller_cannot_choose_id_or_created_date() {
    let srv = TestServer::spawn().await;
    let chosen_id = "0190b6c8-3f5e-7b5a-9c1d-2e3f4a5b6c7d";
    let before = Utc::now() - ChronoDuration::seconds(1);

    let res = reqwest::Client::new()
        .post(srv.url("/items"))
        .bearer_auth(admin_token())
        .json(&json!({
            "id": chosen_id,
            "name": "Sword",
            "description": "Basic",
            "price": 10.0,
            "createdDate": "2000-01-01T00:00:00Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let created: serde_json::Value = res.json().await.unwrap();
    assert_ne!(created["id"], chosen_id);

    let created_date: chrono::DateTime<Utc> = created["createdDate"].as_str().unwrap().parse().unwrap();
    assert!(created_date >= before);
    assert!(created_date <= Utc::now());
}
