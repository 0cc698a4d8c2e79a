mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use common::{generation, TestApp, Upstream};

/// A queued row owned by `user`, as the client inserts it before calling a function
fn queued_row(app: &TestApp, user: Uuid, tool_type: &str) -> Uuid {
    let row = generation(user, tool_type, "queued", None, json!({}), Utc::now());
    let id = row.id;
    app.generations.seed(row);
    id
}

#[tokio::test]
async fn functions_require_a_generation_id() {
    let app = TestApp::new();
    let (_, token) = app.user_with_tokens(0);

    let (status, body) = app
        .send(Method::POST, "/functions/v1/fal-ltxv", Some(&token), Some(json!({"prompt": "x"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "Generation ID is required"}));

    let (status, body) = app
        .send(Method::POST, "/functions/v1/fal-nope", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Function fal-nope not found");
}

#[tokio::test]
async fn fal_function_moves_row_to_processing_and_records_the_request() {
    let app = TestApp::new();
    let (user, token) = app.user_with_tokens(0);
    let id = queued_row(&app, user, "fal_ltxv");

    let (status, body) = app
        .send(
            Method::POST,
            "/functions/v1/fal-ltxv",
            Some(&token),
            Some(json!({
                "generationId": id,
                "imageUrl": "https://uploads/cat.png",
                "prompt": "the cat turns its head"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "queued");
    assert_eq!(body["generation_id"], id.to_string());
    assert_eq!(body["fal_request_id"], "req-123");

    let row = app.generations.find(id).unwrap();
    assert_eq!(row.status, "processing");
    let metadata = row.metadata.unwrap();
    assert_eq!(metadata["status"], "queued_at_fal");
    assert_eq!(metadata["webhook_enabled"], true);
    assert_eq!(app.fal.calls()[0].params["image_url"], "https://uploads/cat.png");
}

#[tokio::test]
async fn fal_function_validation_fails_the_row() {
    let app = TestApp::new();
    let (user, token) = app.user_with_tokens(0);

    let id = queued_row(&app, user, "fal_mmaudio_v2");
    let (status, body) = app
        .send(
            Method::POST,
            "/functions/v1/fal-mmaudio-v2",
            Some(&token),
            Some(json!({"generationId": id, "prompt": "rain on a tin roof", "duration": 45})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Duration must be between 1 and 30 seconds");
    let row = app.generations.find(id).unwrap();
    assert_eq!(row.status, "failed");
    assert_eq!(row.error_message.as_deref(), Some("Duration must be between 1 and 30 seconds"));

    let id = queued_row(&app, user, "fal_video_upscaler");
    let (status, body) = app
        .send(
            Method::POST,
            "/functions/v1/fal-video-upscaler",
            Some(&token),
            Some(json!({"generationId": id, "videoUrl": "https://uploads/v.mp4", "scale": 3})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Scale must be 2 or 4");
    assert!(app.fal.calls().is_empty());
}

#[tokio::test]
async fn functions_cannot_touch_another_users_generation() {
    let app = TestApp::new();
    let (owner, _) = app.user_with_tokens(0);
    let (_, intruder) = app.user_with_tokens(0);
    let id = queued_row(&app, owner, "fal_hidream_i1");

    let (status, body) = app
        .send(
            Method::POST,
            "/functions/v1/fal-hidream-i1",
            Some(&intruder),
            Some(json!({"generationId": id, "prompt": "not yours"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Generation not found");
    assert_eq!(app.generations.find(id).unwrap().status, "queued");
    assert!(app.fal.calls().is_empty());
}

#[tokio::test]
async fn scene_submission_maps_model_and_records_railway_id() {
    let app = TestApp::new();
    let (user, token) = app.user_with_tokens(0);
    let id = queued_row(&app, user, "ai_scene_gen");

    let (status, body) = app
        .send(
            Method::POST,
            "/functions/v1/ai-scene-gen",
            Some(&token),
            Some(json!({
                "generationId": id,
                "imageUrl": "https://uploads/street.png",
                "actionDirection": "slow dolly forward",
                "modelType": "WAN Pro",
                "aspectRatio": "16:9",
                "seed": -1
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["railway_generation_id"], "railway-42");
    assert_eq!(body["model_type"], "wan-pro");
    assert_eq!(body["estimated_completion"], "3-7 minutes");

    let calls = app.scenes.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["model_type"], "wan-pro");
    assert_eq!(calls[0]["model_params"]["aspect_ratio"], "16:9");
    assert!(calls[0]["seed"].is_null());
    assert!(calls[0]["webhook_url"].as_str().unwrap().ends_with("/functions/v1/railway-webhook"));

    let row = app.generations.find(id).unwrap();
    assert_eq!(row.status, "processing");
    assert_eq!(row.metadata.unwrap()["tool_type"], "ai-scene-wan-pro");
}

#[tokio::test]
async fn scene_errors_use_the_scene_error_shape() {
    let app = TestApp::new();
    let (user, token) = app.user_with_tokens(0);
    let id = queued_row(&app, user, "ai_scene_gen");

    let (status, body) = app
        .send(
            Method::POST,
            "/functions/v1/ai-scene-gen",
            Some(&token),
            Some(json!({"generationId": id, "imageUrl": "https://uploads/a.png"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Action direction is required");
    assert!(body["details"].is_string());
    assert!(app.scenes.calls().is_empty());

    app.scenes.respond_with(Upstream::Reject(503, "Railway API error: GPU pool exhausted".into()));
    let (status, body) = app
        .send(
            Method::POST,
            "/functions/v1/ai-scene-gen",
            Some(&token),
            Some(json!({"generationId": id, "imageUrl": "https://uploads/a.png", "actionDirection": "pan"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Railway API error: GPU pool exhausted");
    assert_eq!(app.generations.find(id).unwrap().status, "failed");
}

#[tokio::test]
async fn scene_timeout_keeps_processing() {
    let app = TestApp::new();
    let (user, token) = app.user_with_tokens(0);
    let id = queued_row(&app, user, "ai_scene_gen");
    app.scenes.respond_with(Upstream::Timeout);

    let (status, body) = app
        .send(
            Method::POST,
            "/functions/v1/ai-scene-gen",
            Some(&token),
            Some(json!({"generationId": id, "imageUrl": "https://uploads/a.png", "actionDirection": "pan"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timeout_handled"], true);

    let row = app.generations.find(id).unwrap();
    assert_eq!(row.status, "processing");
    assert_eq!(row.metadata.unwrap()["submission_timeout"], true);
}
