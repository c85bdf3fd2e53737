//! Callflow processor server
//!
//! Aggregates call, connection, event, and operator data from four
//! paginated sources and dispatches derived CDRs to the persistent store
//! or the remote batch receiver on admin trigger.

use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use callflow_api::handlers::{configure_admin, configure_cdrs};
use callflow_core::models::{Call, CallEvent, Connection, Operator};
use callflow_core::AppConfig;
use callflow_db::create_pool;
use callflow_services::{HttpExternalCdrSink, PipelineRunner, SourceSet};
use callflow_sources::{FetchPolicy, HttpPageSource, SourceFetcher};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "callflow-processor",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Configure API routes
fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .configure(configure_admin)
        .configure(configure_cdrs);
}

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "callflow_processor={},callflow_api={},callflow_services={},callflow_sources={},callflow_db={},actix_web=info,sqlx=warn",
            log_level, log_level, log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    info!(
        "Starting callflow processor v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration from environment and config files
    let config = AppConfig::load().expect("Failed to load configuration");

    info!("Connecting to database...");
    let pool = create_pool(&config.database.url, Some(config.database.max_connections))
        .await
        .expect("Failed to create database pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    info!("Database ready");

    // Shared HTTP clients for sources and the external sink
    let source_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.sources.request_timeout_secs))
        .build()
        .expect("Failed to build source HTTP client");

    let sink_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.external_sink.request_timeout_secs))
        .build()
        .expect("Failed to build sink HTTP client");

    let sources = SourceSet {
        calls: Arc::new(HttpPageSource::<Call>::new(
            source_client.clone(),
            config.sources.calls_url.clone(),
            "calls",
        )),
        connections: Arc::new(HttpPageSource::<Connection>::new(
            source_client.clone(),
            config.sources.connections_url.clone(),
            "connections",
        )),
        call_events: Arc::new(HttpPageSource::<CallEvent>::new(
            source_client.clone(),
            config.sources.call_events_url.clone(),
            "call_events",
        )),
        operators: Arc::new(HttpPageSource::<Operator>::new(
            source_client,
            config.sources.operators_url.clone(),
            "operators",
        )),
    };

    let cdr_repo = Arc::new(
        callflow_db::PgCdrRepository::new(pool.clone())
            .with_upsert_concurrency(config.pipeline.upsert_concurrency),
    );

    let external_sink = Arc::new(HttpExternalCdrSink::new(
        sink_client,
        config.external_sink.upload_url.clone(),
    ));

    let runner = Arc::new(PipelineRunner::new(
        sources,
        SourceFetcher::new(FetchPolicy::from(&config.sources)),
        cdr_repo,
        external_sink,
        config.pipeline.clone(),
    ));

    let bind_addr = config.server_addr();
    let workers = config.server.workers;
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::from(runner.clone()))
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}
