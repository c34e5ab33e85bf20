mod business_logic;
mod config;
mod errors;
mod models;
mod routes;
mod services;

use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::models::observation::{Bar, Observation};
use crate::models::status::{MonitorStatus, MonitoringToggle, StatusSnapshot, WindowResponse};
use crate::services::binance::BinanceClient;
use crate::services::monitor::MonitorService;
use crate::services::monitor_state::{MonitorStateInner, SharedMonitorState};
use crate::services::telegram::TelegramNotifier;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::status::get_status,
        routes::status::get_status_stream,
        routes::status::get_window,
        routes::monitoring::set_monitoring
    ),
    components(schemas(
        routes::health::HealthResponse,
        MonitorStatus,
        StatusSnapshot,
        WindowResponse,
        Observation,
        Bar,
        MonitoringToggle,
        errors::ErrorResponse
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let _log_guard = init_tracing(&config);

    let monitor_state: SharedMonitorState = Arc::new(MonitorStateInner::new(&config.symbol));

    let source = Arc::new(BinanceClient::new(config.binance_api_key.clone()));
    let notifier = Arc::new(TelegramNotifier::new(
        config.telegram_bot_token.clone(),
        config.telegram_chat_id.clone(),
    ));
    let mut monitor = MonitorService::new(
        config.symbol.clone(),
        config.monitor.clone(),
        source,
        notifier,
        monitor_state.clone(),
    );

    tracing::info!(
        "Monitoring {} every {}s (drop threshold ${})",
        config.symbol,
        config.monitor.poll_interval_secs,
        config.monitor.drop_threshold
    );
    tokio::spawn(async move {
        monitor.run().await;
    });

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route("/status", get(routes::status::get_status))
        .route("/status/stream", get(routes::status::get_status_stream))
        .route("/window", get(routes::status::get_window))
        .route("/monitoring", put(routes::monitoring::set_monitoring))
        .with_state(monitor_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server running on http://{}", config.bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Stdout logging, plus a daily rolling file when `LOG_DIR` is set.
/// The returned guard flushes the file writer on drop.
fn init_tracing(config: &AppConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dropwatch=info,tower_http=debug".into());

    let (file_layer, guard) = match config.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::daily(dir, "dropwatch.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}
