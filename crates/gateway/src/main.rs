//! DocQA Gateway
//!
//! HTTP entry point for the question-answering service.
//! Handles:
//! - The chat page and question endpoints
//! - Input validation and per-request timeouts
//! - Rate limiting and concurrency limits
//! - Observability (logging, metrics)

mod handlers;
mod middleware;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use docqa_common::{
    config::{AppConfig, ObservabilityConfig},
    metrics,
    models::{build_generator, build_summarizer},
    nlp::RuleTagger,
    AnswerResolver, DocumentSource, DocumentStore, QuestionBank, ResolverOptions,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use middleware::rate_limit::{rate_limit_middleware, GlobalRateLimiter};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<AnswerResolver>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = match std::env::var("DOCQA_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        Err(_) => AppConfig::load().context("Failed to load configuration")?,
    };

    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting DocQA Gateway v{}",
        docqa_common::VERSION
    );

    init_metrics(&config.observability)?;

    let listen = format!("{}:{}", config.server.host, config.server.port);
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid listen address {}", listen))?;

    let state = build_state(config).map_err(|e| {
        error!(error = %e, "Failed to initialize answer pipeline");
        e
    })?;

    // Build the router
    let app = create_router(state);

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// JSON or human-readable logs; `RUST_LOG` overrides the configured level
fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Install the Prometheus exporter (unless disabled) and describe metrics
fn init_metrics(config: &ObservabilityConfig) -> anyhow::Result<()> {
    if config.metrics_port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .set_buckets(metrics::LATENCY_BUCKETS)?
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!(port = config.metrics_port, "Metrics exporter listening");
    }

    metrics::register_metrics();
    Ok(())
}

/// Load the question bank and wire the resolver. The document is decoded on
/// first use.
fn build_state(config: AppConfig) -> docqa_common::Result<AppState> {
    let bank = QuestionBank::load(&config.question_bank.path, config.question_bank.match_mode)?;
    let document = DocumentStore::new(DocumentSource::from_path(&config.document.path));
    info!(source = %document.source().describe(), "Document source configured");

    let summarizer = build_summarizer(&config.summarizer)?;
    let generator = build_generator(&config.generator)?;

    let resolver = AnswerResolver::new(
        Arc::new(bank),
        Arc::new(document),
        Arc::new(RuleTagger::new(config.nlp.max_input_chars)),
        summarizer,
        generator,
        ResolverOptions::from(&config),
    );

    Ok(AppState {
        config: Arc::new(config),
        resolver: Arc::new(resolver),
    })
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let mut question_routes = Router::new()
        .route("/get_response", post(handlers::ask::get_response))
        .route("/api/ask", post(handlers::ask::ask));

    let rate_limit = &state.config.rate_limit;
    if rate_limit.enabled {
        let limiter = GlobalRateLimiter::new(rate_limit.requests_per_second, rate_limit.burst);
        question_routes = question_routes.layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ));
    }

    let max_concurrent = state.config.server.max_concurrent_requests.max(1);

    Router::new()
        .route("/", get(handlers::index::index))
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .merge(question_routes)
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
