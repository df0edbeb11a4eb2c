//! Application startup and lifecycle management.

use crate::config::{ProviderKind, RecipeConfig};
use crate::error::{GENERATION_FAILED, GENERATION_FAILED_MESSAGE};
use crate::handlers;
use crate::middleware::metrics_middleware;
use crate::services::providers::{
    BedrockApiKeyConfig, BedrockApiKeyProvider, BedrockProvider, BedrockSdkConfig, MockProvider,
    TextProvider,
};
use crate::services::RecipeGenerator;
use axum::{
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, request_span, security_headers_middleware};
use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<RecipeGenerator>,
}

impl AppState {
    pub fn new(generator: RecipeGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }
}

/// Routes plus the middleware stack, outermost last.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/generate-recipe", post(handlers::generate_recipe))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// A panic while serving a request becomes the same generic failure as any
/// other generation error.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");

    AppError::internal(
        GENERATION_FAILED,
        GENERATION_FAILED_MESSAGE,
        anyhow::anyhow!("handler panicked: {}", detail),
    )
    .into_response()
}

async fn build_provider(config: &RecipeConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    match config.provider {
        ProviderKind::Bedrock => {
            let settings = &config.bedrock;

            match &settings.api_key {
                Some(api_key) => {
                    let provider = BedrockApiKeyProvider::new(BedrockApiKeyConfig {
                        region: settings.region.clone(),
                        model_id: settings.model_id.clone(),
                        endpoint: settings.endpoint.clone(),
                        api_key: api_key.clone(),
                        timeout: settings.timeout,
                    })
                    .map_err(|e| AppError::ConfigError(e.into()))?;

                    tracing::info!(
                        region = %settings.region,
                        model = %settings.model_id,
                        endpoint = %provider.endpoint(),
                        auth = "api_key",
                        "Initialized Bedrock provider"
                    );
                    Ok(Arc::new(provider))
                }
                None => {
                    let provider = BedrockProvider::from_config(&BedrockSdkConfig {
                        region: settings.region.clone(),
                        model_id: settings.model_id.clone(),
                        endpoint: settings.endpoint.clone(),
                        timeout: settings.timeout,
                    })
                    .await;

                    tracing::info!(
                        region = %settings.region,
                        model = %settings.model_id,
                        endpoint = settings.endpoint.as_deref().unwrap_or("default"),
                        auth = "default_credential_chain",
                        "Initialized Bedrock provider"
                    );
                    Ok(Arc::new(provider))
                }
            }
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock provider; recipes are canned placeholders");
            Ok(Arc::new(MockProvider))
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: RecipeConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config).await?;
        let generator = RecipeGenerator::from_settings(provider, &config.generation);

        tracing::info!(
            provider = generator.provider_name(),
            max_tokens = config.generation.max_tokens,
            temperature = config.generation.temperature,
            "Initialized recipe generator"
        );

        let router = build_router(AppState::new(generator));

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Recipe service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.port
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until_stopped<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
