// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

// Integration tests for the strings HTTP API
//
// These run the full router (health, CORS and trace layers included) against
// a snapshot-backed store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use stringlens_server::api::{AppState, RecordView};
use stringlens_server::config::ServerConfig;
use stringlens_server::{build_router, open_store};
use stringlens_query::StringEngine;
use tempfile::TempDir;
use tower::ServiceExt;

fn app_for(data_dir: &TempDir) -> Router {
    let mut config = ServerConfig::default();
    config.storage.data_dir = data_dir.path().to_path_buf();

    let store = open_store(&config).unwrap();
    let engine = StringEngine::new(store).unwrap();
    build_router(AppState::new(engine), &config.server).unwrap()
}

fn create(value: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/strings")
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::json!({ "value": value }).to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_count() {
    let dir = TempDir::new().unwrap();
    let app = app_for(&dir);

    app.clone().oneshot(create("kayak")).await.unwrap();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["strings"], 1);
}

#[tokio::test]
async fn test_records_survive_restart() {
    let dir = TempDir::new().unwrap();

    let created = {
        let app = app_for(&dir);
        let response = app.oneshot(create("Was it a car or a cat I saw")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        serde_json::from_value::<RecordView>(body_json(response).await).unwrap()
    };
    assert!(created.properties.is_palindrome);
    assert_eq!(created.properties.word_count, 8);

    let app = app_for(&dir);
    let response = app
        .oneshot(get("/strings/Was%20it%20a%20car%20or%20a%20cat%20I%20saw"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reloaded: RecordView = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(reloaded.id, created.id);
    assert_eq!(reloaded.created_at, created.created_at);
    assert_eq!(
        reloaded.properties.character_frequency_map,
        created.properties.character_frequency_map
    );
}

#[tokio::test]
async fn test_full_lifecycle() {
    let dir = TempDir::new().unwrap();
    let app = app_for(&dir);

    for value in ["racecar", "stats", "open source", "a"] {
        let response = app.clone().oneshot(create(value)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get("/strings?is_palindrome=true&min_length=2"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let values: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, vec!["racecar", "stats"]);
    assert_eq!(body["count"], 2);

    let response = app
        .clone()
        .oneshot(get("/strings?word_count=2"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["value"], "open source");
    assert_eq!(body["filters_applied"]["word_count"], 2);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/strings/racecar")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get("/strings")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["filters_applied"], serde_json::json!({}));
}

#[tokio::test]
async fn test_unmatched_path_returns_json_not_found() {
    let dir = TempDir::new().unwrap();
    let app = app_for(&dir);

    let response = app.clone().oneshot(create("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The empty value has no addressable path
    let response = app.oneshot(get("/strings/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"], "No route for /strings/");
}
