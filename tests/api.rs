// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Router-level tests over the in-memory database.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use dogy_api::{
    api::router,
    auth::{DogyClaims, TokenVerifier},
    state::AppState,
    storage::{Database, MemoryDatabase, TableCounts},
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

const PRIVATE_KEY: &str = include_str!("fixtures/jwt_private.pem");
const PUBLIC_KEY: &str = include_str!("fixtures/jwt_public.pem");

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup() -> (Router, MemoryDatabase) {
    let db = MemoryDatabase::new();
    let verifier = TokenVerifier::from_pem(PUBLIC_KEY.as_bytes()).unwrap();
    let state = AppState::new(Arc::new(db.clone()), verifier);
    (router(state), db)
}

fn token(sub: &str) -> String {
    token_with_role(sub, None)
}

fn token_with_role(sub: &str, role: Option<&str>) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = DogyClaims {
        sub: sub.to_string(),
        role: role.map(str::to_string),
        exp: now + 3600,
        nbf: None,
        iat: Some(now),
        iss: None,
        sid: None,
    };
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap();
    encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap()
}

fn request(method: &str, uri: &str, sub: Option<&str>, body: Option<Value>) -> Request<Body> {
    request_with_token(method, uri, sub.map(token), body)
}

fn admin_request(method: &str, uri: &str, sub: &str) -> Request<Body> {
    request_with_token(method, uri, Some(token_with_role(sub, Some("admin"))), None)
}

fn request_with_token(
    method: &str,
    uri: &str,
    token: Option<String>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn ana() -> Value {
    json!({
        "name": "Ana",
        "gender": "female",
        "hasOnboarded": true,
        "timezone": "Europe/Madrid",
        "notifications": {
            "enabled": true,
            "isRegistered": true,
            "dailyEnabled": false,
            "playtimeEnabled": true
        },
        "subscription": {
            "subscriptionType": "active",
            "isTrialMode": true,
            "trialStartDate": "2025-03-01"
        }
    })
}

fn toby() -> Value {
    json!({
        "name": "Toby",
        "birthday": "2024-02-29",
        "photoUrl": "https://img.dogy.test/toby.png",
        "gender": "male",
        "size": "medium",
        "weight": "12.50",
        "attributes": {
            "allergies": ["Wheat", "Beef"],
            "breeds": ["Beagle"],
            "interactions": ["Good with cats/other pets"],
            "isSterilized": true
        },
        "isDogOwner": true,
        "isDogSitter": false
    })
}

async fn create_user(app: &Router, sub: &str) {
    let response = app
        .clone()
        .oneshot(request("POST", "/api/v1/users", Some(sub), Some(ana())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn create_ana(app: &Router) {
    create_user(app, "ext_123").await;
}

async fn create_toby(app: &Router) -> Value {
    let response = app
        .clone()
        .oneshot(request("POST", "/api/v1/pets", Some("ext_123"), Some(toby())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ─── Public routes ──────────────────────────────────────────────────────

#[tokio::test]
async fn welcome_routes_are_public() {
    let (app, _) = setup();

    let response = app.clone().oneshot(request("GET", "/", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Welcome to Dogy API");

    let response = app.oneshot(request("GET", "/api/v1", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Welcome to Dogy API v1");
}

#[tokio::test]
async fn vocabularies_need_no_token() {
    let (app, _) = setup();

    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/pets/allergies", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0], "None");
    assert!(body.as_array().unwrap().contains(&json!("Tree Nuts")));

    let response = app
        .oneshot(request("GET", "/api/v1/pets/breeds", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let (app, _) = setup();
    let response = app.oneshot(request("GET", "/health/live", None, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

// ─── Authentication ─────────────────────────────────────────────────────

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (app, _) = setup();
    let response = app
        .oneshot(request("GET", "/api/v1/users", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        r#"Bearer realm="Restricted""#
    );
    let body = body_json(response).await;
    assert_eq!(body["message"], "Empty token. Please provide a valid token.");
}

#[tokio::test]
async fn wrong_scheme_and_bad_token_are_unauthorized() {
    let (app, _) = setup();

    let basic = Request::builder()
        .uri("/api/v1/pets")
        .header(header::AUTHORIZATION, format!("Basic {}", token("ext_123")))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(basic).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["message"],
        "Invalid authentication type. Please provide a valid token."
    );

    let garbage = Request::builder()
        .uri("/api/v1/pets")
        .header(header::AUTHORIZATION, "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(garbage).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["message"],
        "Invalid token. Please provide a valid token."
    );
}

#[tokio::test]
async fn unknown_caller_is_not_found() {
    let (app, _) = setup();
    let response = app
        .oneshot(request("GET", "/api/v1/users", Some("ext_nobody"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["message"],
        "User internal ID not found on the database."
    );
}

// ─── Users ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_read_user() {
    let (app, db) = setup();

    let response = app
        .clone()
        .oneshot(request("POST", "/api/v1/users", Some("ext_123"), Some(ana())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["externalID"], "ext_123");
    assert_eq!(created["name"], "Ana");
    assert_eq!(created["subscription"]["trialStartDate"], "2025-03-01");

    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/users", Some("ext_123"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/users/ext_123", Some("ext_123"), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, created);

    // Lookup of another user by external id needs the admin role.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/users/ext_123", Some("ext_other"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(admin_request("GET", "/api/v1/users/ext_123", "ext_admin"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);

    let counts = db.counts().await;
    assert_eq!(
        counts,
        TableCounts {
            users: 1,
            subscriptions: 1,
            notifications: 1,
            ..TableCounts::default()
        }
    );
}

#[tokio::test]
async fn duplicate_user_conflicts() {
    let (app, db) = setup();
    create_ana(&app).await;

    let response = app
        .oneshot(request("POST", "/api/v1/users", Some("ext_123"), Some(ana())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["message"], "User already exists.");
    assert_eq!(db.counts().await.users, 1);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (app, db) = setup();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/users",
            Some("ext_123"),
            Some(json!({"name": "Ana", "gender": "robot"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid request body.");

    let not_json = Request::builder()
        .method("POST")
        .uri("/api/v1/users")
        .header(header::AUTHORIZATION, format!("Bearer {}", token("ext_123")))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(not_json).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(db.counts().await, TableCounts::default());
}

#[tokio::test]
async fn users_cannot_delete_each_other() {
    let (app, db) = setup();
    create_user(&app, "ext_victim").await;
    create_user(&app, "ext_attacker").await;

    let response = app
        .clone()
        .oneshot(request("DELETE", "/api/v1/users/ext_victim", Some("ext_attacker"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["message"],
        "User internal ID not found on the database."
    );
    assert!(db.internal_id("ext_victim").await.unwrap().is_some());

    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/users", Some("ext_victim"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(admin_request("DELETE", "/api/v1/users/ext_victim", "ext_admin"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(db.internal_id("ext_victim").await.unwrap().is_none());
    assert_eq!(db.counts().await.users, 1);
}

#[tokio::test]
async fn over_long_name_is_bad_request() {
    let (app, db) = setup();

    let mut user = ana();
    user["name"] = json!("a".repeat(300));
    let response = app
        .clone()
        .oneshot(request("POST", "/api/v1/users", Some("ext_123"), Some(user)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Name must be at most 255 characters."
    );
    assert_eq!(db.counts().await, TableCounts::default());

    create_ana(&app).await;
    let mut pet = toby();
    pet["name"] = json!("b".repeat(300));
    let response = app
        .oneshot(request("POST", "/api/v1/pets", Some("ext_123"), Some(pet)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(db.counts().await.pets, 0);
}

#[tokio::test]
async fn partial_user_updates() {
    let (app, _) = setup();
    create_ana(&app).await;

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            "/api/v1/users",
            Some("ext_123"),
            Some(json!({"name": "Ana María", "hasOnboarded": false})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let user = body_json(response).await;
    assert_eq!(user["name"], "Ana María");
    assert_eq!(user["hasOnboarded"], false);
    assert_eq!(user["timezone"], "Europe/Madrid");

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            "/api/v1/users/subscription",
            Some("ext_123"),
            Some(json!({"subscriptionType": "inactive", "isTrialMode": false})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let user = body_json(response).await;
    assert_eq!(user["subscription"]["subscriptionType"], "inactive");
    assert_eq!(user["subscription"]["trialStartDate"], "2025-03-01");

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            "/api/v1/users/notifications",
            Some("ext_123"),
            Some(json!({"dailyEnabled": true})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let user = body_json(response).await;
    assert_eq!(user["notifications"]["dailyEnabled"], true);
    assert_eq!(user["notifications"]["enabled"], true);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/users", Some("ext_123"), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, user);

    let response = app
        .oneshot(request(
            "PATCH",
            "/api/v1/users",
            Some("ext_nobody"),
            Some(json!({"name": "Eva"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_user_removes_everything() {
    let (app, db) = setup();
    create_ana(&app).await;
    let response = app
        .clone()
        .oneshot(request("POST", "/api/v1/pets", Some("ext_123"), Some(toby())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("DELETE", "/api/v1/users", Some("ext_123"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "User deleted successfully.");

    let counts = db.counts().await;
    assert_eq!(counts.users, 0);
    assert_eq!(counts.subscriptions, 0);
    assert_eq!(counts.links, 0);

    let response = app
        .oneshot(request("DELETE", "/api/v1/users/ext_123", Some("ext_123"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ─── Pets ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_list_get_and_delete_pet() {
    let (app, db) = setup();
    create_ana(&app).await;

    let response = app
        .clone()
        .oneshot(request("POST", "/api/v1/pets", Some("ext_123"), Some(toby())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let pet = body_json(response).await;
    assert_eq!(pet["weight"], "12.50");
    assert_eq!(pet["birthday"], "2024-02-29");
    assert_eq!(pet["attributes"]["allergies"], json!(["Beef", "Wheat"]));
    assert_eq!(pet["isDogOwner"], true);
    let pet_id = pet["petID"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/pets", Some("ext_123"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([pet.clone()]));

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/api/v1/pets/{pet_id}"), Some("ext_123"), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, pet);

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/v1/pets/{pet_id}"),
            Some("ext_123"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Pet deleted successfully.");
    assert_eq!(db.counts().await.pets, 0);

    let response = app
        .oneshot(request("GET", &format!("/api/v1/pets/{pet_id}"), Some("ext_123"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn weight_with_trailing_zeros_is_accepted() {
    let (app, _) = setup();
    create_ana(&app).await;

    let mut pet = toby();
    pet["weight"] = json!("12.500");
    let response = app
        .oneshot(request("POST", "/api/v1/pets", Some("ext_123"), Some(pet)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["weight"], "12.50");
}

#[tokio::test]
async fn update_pet_and_replace_attributes() {
    let (app, _) = setup();
    create_ana(&app).await;
    let pet = create_toby(&app).await;
    let pet_id = pet["petID"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/v1/pets/{pet_id}"),
            Some("ext_123"),
            Some(json!({"weight": "13.2", "size": "large"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["weight"], "13.20");
    assert_eq!(updated["size"], "large");
    assert_eq!(updated["name"], "Toby");
    assert_eq!(updated["attributes"], pet["attributes"]);

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/v1/pets/attributes/{pet_id}"),
            Some("ext_123"),
            Some(json!({"allergies": ["Soy", "Beef"], "interactions": [], "isSterilized": false})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["attributes"]["allergies"], json!(["Beef", "Soy"]));
    assert_eq!(updated["attributes"]["interactions"], json!([]));
    assert_eq!(updated["attributes"]["breeds"], json!(["Beagle"]));
    assert_eq!(updated["attributes"]["isSterilized"], false);

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/api/v1/pets/{pet_id}"), Some("ext_123"), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, updated);

    let response = app
        .oneshot(request(
            "PATCH",
            &format!("/api/v1/pets/attributes/{pet_id}"),
            Some("ext_123"),
            Some(json!({"breeds": ["Wolf"]})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pets_of_other_users_are_invisible() {
    let (app, _) = setup();
    create_ana(&app).await;
    let response = app
        .clone()
        .oneshot(request("POST", "/api/v1/users", Some("ext_456"), Some(ana())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("POST", "/api/v1/pets", Some("ext_123"), Some(toby())))
        .await
        .unwrap();
    let pet_id = body_json(response).await["petID"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/api/v1/pets/{pet_id}"), Some("ext_456"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/v1/pets/{pet_id}"),
            Some("ext_456"),
            Some(json!({"name": "Mine"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request("GET", "/api/v1/pets", Some("ext_456"), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn pet_id_errors_are_bad_requests() {
    let (app, _) = setup();
    create_ana(&app).await;

    let response = app
        .clone()
        .oneshot(request("DELETE", "/api/v1/pets", Some("ext_123"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Missing pet ID.");

    let response = app
        .oneshot(request("GET", "/api/v1/pets/12", Some("ext_123"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid pet ID.");
}

#[tokio::test]
async fn invalid_pet_writes_nothing() {
    let (app, db) = setup();
    create_ana(&app).await;
    let before = db.counts().await;

    let mut pet = toby();
    pet["weight"] = json!("-1.00");
    let response = app
        .clone()
        .oneshot(request("POST", "/api/v1/pets", Some("ext_123"), Some(pet)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut pet = toby();
    pet["attributes"]["breeds"] = json!(["Wolf"]);
    let response = app
        .oneshot(request("POST", "/api/v1/pets", Some("ext_123"), Some(pet)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(db.counts().await, before);
}
