//! End-to-end tests against a running server backed by the mock provider.

use recipe_service::config::RecipeConfig;
use recipe_service::startup::Application;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Spawn the application on a random port and return the port number.
async fn spawn_app() -> u16 {
    // Every test in this binary sets the same values.
    std::env::set_var("ENVIRONMENT", "test");
    std::env::set_var("APP__PORT", "0"); // Random port
    std::env::set_var("RECIPE_PROVIDER", "mock");

    let config = RecipeConfig::load().expect("Failed to load config");
    let app = Application::build(config)
        .await
        .expect("Failed to build application");

    let port = app.http_port();

    // Spawn the server in the background
    tokio::spawn(async move {
        let _ = app.run_until_stopped(std::future::pending()).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    port
}

#[tokio::test]
async fn health_check_works() {
    let port = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn mock_provider_serves_a_recipe() {
    let port = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("http://127.0.0.1:{}/api/v1/generate-recipe", port))
        .header("x-request-id", "e2e-test-1")
        .json(&json!({"prompt": "tomato soup"}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "e2e-test-1");

    let body: Value = response.json().await.expect("Failed to parse response");
    let recipes = body["recipes"].as_array().expect("recipes should be a list");
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0]["title"], "Recipe for: tomato soup");
}
