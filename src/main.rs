use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

mod classifier;
mod db;
mod documents;
mod errors;
mod handlers;
mod middleware;
mod models;
mod openai_client;
mod prompts;

// AppState holds the database connection pool, the OpenAI client, the media
// store for generated artifacts, and the system prompt directory.
pub struct AppState {
    pub db_pool: sqlx::PgPool,
    pub openai_client: Option<openai_client::OpenAiClient>,
    pub media: documents::MediaStore,
    pub system_prompts: prompts::SystemPrompts,
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging().expect("Failed to initialize logging");

    let media_root = std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());
    let media_url = std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".to_string());
    let prompts_dir =
        std::env::var("SYSTEM_MESSAGES_DIR").unwrap_or_else(|_| "system_messages".to_string());

    // Ensure the artifact directories exist up front
    for subdir in ["pdf", "ppt"] {
        let dir = std::path::Path::new(&media_root).join(subdir);
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!("Failed to create {}: {}", dir.display(), e);
        }
    }

    // Create the database connection pool
    let db_pool = db::create_pool()
        .await
        .expect("Failed to create database pool.");

    // Initialize the OpenAI client if an API key is provided
    let openai_client = match std::env::var("OPENAI_API_KEY").ok() {
        Some(api_key) if !api_key.is_empty() => {
            tracing::info!("Initializing OpenAI client...");
            Some(openai_client::OpenAiClient::new(api_key))
        }
        _ => {
            tracing::warn!("OPENAI_API_KEY not found. Chat and export features will be disabled.");
            None
        }
    };

    let shared_state = Arc::new(AppState {
        db_pool,
        openai_client,
        media: documents::MediaStore::new(&media_root, media_url.as_str()),
        system_prompts: prompts::SystemPrompts::new(&prompts_dir),
    });

    // Build our application with all routes and shared state
    let app = Router::new()
        .merge(handlers::ui::ui_routes())
        .merge(handlers::auth::auth_routes())
        .merge(handlers::chat::chat_routes())
        .nest_service("/media", ServeDir::new(&media_root))
        .layer(axum::middleware::from_fn(
            middleware::logging::request_logging_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(Extension(shared_state));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}

// Logging configuration: human-readable by default, JSON when LOG_FORMAT=json
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,research_dashboard=trace,sqlx=info,reqwest=info,hyper=info".to_string()
        } else {
            "info,sqlx=warn,reqwest=warn,hyper=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Research Assistant dashboard starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let db_configured = std::env::var("DATABASE_URL").is_ok();
    let openai_configured = std::env::var("OPENAI_API_KEY").is_ok();
    tracing::info!(
        "Configuration - Database: {}, OpenAI: {}",
        if db_configured { "set" } else { "missing" },
        if openai_configured { "set" } else { "missing" }
    );

    Ok(())
}
