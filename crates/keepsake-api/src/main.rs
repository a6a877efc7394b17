use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use keepsake_api::auth::StaticTokenVerifier;
use keepsake_api::config::Config;
use keepsake_api::handlers::{chat, health, memories, tags};
use keepsake_api::state::AppState;
use keepsake_llm::{AnthropicClient, GatewayClient};
use keepsake_persist::PersistClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config =
        Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting Keepsake API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // Initialize AI clients
    let anthropic = AnthropicClient::new(config.anthropic_api_key.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create Anthropic client: {}", e))?;
    let gateway = GatewayClient::new(config.gateway_api_key.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create gateway client: {}", e))?;

    // Initialize persistence client
    tracing::info!("Connecting to MongoDB");
    let persist = PersistClient::new(&config.mongodb_uri, &config.mongodb.database).await?;
    tracing::info!("MongoDB connected");

    // Token verification
    let verifier = StaticTokenVerifier::from_spec(&config.auth_tokens);
    if verifier.is_empty() {
        tracing::warn!("AUTH_TOKENS is empty; every request will be rejected as unauthorized");
    }

    // Create application state
    let state = Arc::new(AppState::new(
        config.clone(),
        persist,
        anthropic,
        gateway,
        Arc::new(verifier),
    ));

    // Build router
    let app = build_router(state.clone());

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // AI functions
        .route("/functions/chat-insights", post(chat::chat_insights))
        .route("/functions/generate-tags", post(tags::generate_tags))
        // Memories
        .route("/memories", post(memories::create_memory))
        .route("/memories", get(memories::list_memories));

    Router::new()
        .merge(api_routes)
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(300))) // 5 min for streaming
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            for origin in &config.cors.origins {
                if let Ok(parsed_origin) = origin.parse::<axum::http::HeaderValue>() {
                    cors = cors.allow_origin(parsed_origin);
                }
            }
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
