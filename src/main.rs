//! classwatch - Classroom Monitoring Server
//!
//! Main entry point.

use classwatch::{
    actuator::{ActuatorBridge, EspClient},
    capture::SnapshotFrameSource,
    environment::EnvironmentPoller,
    face_client::{FaceServiceClient, IdentityResolver},
    monitor::MonitorLoop,
    presence::PresenceTracker,
    realtime_hub::RealtimeHub,
    roster::Roster,
    state::{AppConfig, AppState},
    status::StatusAggregator,
    tracker::ViolationTracker,
    web_api,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classwatch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting classwatch v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(AppConfig::default());
    tracing::info!(
        face_service_url = %config.face_service_url,
        camera_url = %config.camera_url,
        esp_url = %config.esp_url,
        roster_dir = %config.roster_dir.display(),
        "Configuration loaded"
    );

    // Roster is immutable for the session; an empty one is fatal
    let roster = Arc::new(Roster::load(&config.roster_dir)?);
    tracing::info!(persons = roster.len(), "Roster initialized");

    // Identity resolver must be reachable before a session can start
    let resolver: Arc<dyn IdentityResolver> =
        Arc::new(FaceServiceClient::new(config.face_service_url.clone()));
    match resolver.health_check().await {
        Ok(true) => tracing::info!("Face service reachable"),
        Ok(false) => anyhow::bail!("face service reported unhealthy, cannot start session"),
        Err(e) => anyhow::bail!("face service unreachable: {}", e),
    }

    // Device-side components
    let esp = Arc::new(EspClient::new(
        config.esp_url.clone(),
        config.esp_username.clone(),
        config.esp_password.clone(),
    ));
    let actuator = Arc::new(ActuatorBridge::new(esp));
    tracing::info!("ActuatorBridge initialized");

    let environment = Arc::new(EnvironmentPoller::new(
        actuator.clone(),
        config.policy.climate_poll_interval,
        config.policy.temperature_threshold,
        config.policy.warning_dwell,
    ));

    // Core pipeline state
    let frames = Arc::new(SnapshotFrameSource::new(config.camera_url.clone()));
    let tracker = Arc::new(ViolationTracker::new());
    let presence = Arc::new(PresenceTracker::new(
        roster.clone(),
        config.policy.absence_threshold,
    ));
    let status = Arc::new(StatusAggregator::new());
    let realtime = Arc::new(RealtimeHub::new());

    let monitor = Arc::new(MonitorLoop::new(
        roster.clone(),
        frames,
        resolver.clone(),
        tracker.clone(),
        presence.clone(),
        actuator.clone(),
        environment.clone(),
        status.clone(),
        realtime.clone(),
        config.policy.clone(),
    ));
    tracing::info!("MonitorLoop initialized");

    let state = AppState {
        config: config.clone(),
        roster,
        resolver,
        tracker,
        presence,
        status,
        realtime,
        actuator,
        environment: environment.clone(),
        monitor: monitor.clone(),
    };

    // Build router with CORS and request tracing
    let app = web_api::create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start background activities
    environment.start().await;
    tracing::info!("EnvironmentPoller started");

    monitor.start().await;
    tracing::info!("MonitorLoop started - session active");

    // Stop the pipeline cleanly on Ctrl-C
    let shutdown_monitor = monitor.clone();
    let shutdown_environment = environment.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown_monitor.stop().await;
            shutdown_environment.stop().await;
        }
    });

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
