//! Shared helpers for router-level tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use http_body_util::BodyExt;
use recipe_service::services::providers::{
    FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider,
};
use recipe_service::services::RecipeGenerator;
use recipe_service::{build_router, AppState};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const PARAMS: GenerationParams = GenerationParams {
    max_tokens: 1000,
    temperature: 0.3,
};

enum Reply {
    Text(String),
    RateLimited,
    Panic,
}

/// Provider double with a fixed reply, a call counter, and the prompts it
/// was sent.
pub struct StubProvider {
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn replying(text: &str) -> Arc<Self> {
        Self::with(Reply::Text(text.to_string()))
    }

    pub fn rate_limited() -> Arc<Self> {
        Self::with(Reply::RateLimited)
    }

    pub fn panicking() -> Arc<Self> {
        Self::with(Reply::Panic)
    }

    fn with(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextProvider for StubProvider {
    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        match &self.reply {
            Reply::Text(text) => Ok(ProviderResponse {
                text: text.clone(),
                input_tokens: 100,
                output_tokens: 50,
                finish_reason: FinishReason::Complete,
            }),
            Reply::RateLimited => Err(ProviderError::RateLimited("slow down".to_string())),
            Reply::Panic => panic!("stub provider exploded"),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

pub fn app(provider: Arc<StubProvider>) -> axum::Router {
    build_router(AppState::new(RecipeGenerator::new(provider, PARAMS)))
}

pub fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/generate-recipe")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub const VALID_REPLY: &str = r#"{
    "title": "Garlic Butter Chicken",
    "ingredients": [
        {"name": "chicken thighs", "quantity": 4, "unit": "pieces"},
        {"name": "garlic", "quantity": 6, "unit": "cloves"},
        {"name": "butter", "quantity": 1/2, "unit": "cup"},
        {"name": "parsley", "quantity": 0.25, "unit": "cup"}
    ],
    "instructions": "Sear the chicken, add garlic and butter, baste until cooked through.",
    "cookTimeMinutes": 35
}"#;
