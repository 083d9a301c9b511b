//! Trailhunt API server entry point.

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use trailhunt_core::clock::SystemClock;
use trailhunt_core::ports::Messenger;
use trailhunt_decoder::HttpImageDecoder;
use trailhunt_game::application::hunt::Hunt;
use trailhunt_game::domain::game::GamePorts;

use trailhunt_api::config::{self, AppConfig};
use trailhunt_api::error::AppError;
use trailhunt_api::outbox::OutboxMessenger;
use trailhunt_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Trailhunt API server");

    // Read configuration from environment.
    let config = AppConfig::from_env()?;
    let course = config::load_course(&config.course_path)?;
    tracing::info!(
        course = %config.course_path.display(),
        decoder = %config.decoder_url,
        "configuration loaded"
    );

    // Build the hunt.
    let outbox = Arc::new(OutboxMessenger::new());
    let ports = GamePorts {
        messenger: Arc::clone(&outbox) as Arc<dyn Messenger>,
        decoder: Arc::new(HttpImageDecoder::new(
            &config.decoder_url,
            config.decoder_timeout,
        )),
        clock: Arc::new(SystemClock),
    };
    let hunt = Arc::new(Hunt::new(course, ports)?);
    let app_state = AppState::new(hunt, outbox);

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = trailhunt_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server.
    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
