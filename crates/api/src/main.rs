mod cache;
mod config;
mod error;
mod metrics;
mod retry;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use query_extract::{ExtractionResult, Extractor, Gazetteers, HttpRecognizer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, info_span, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cache::{CacheStats, ParseCache};
use config::AppConfig;
use error::ApiError;
use metrics::{Metrics, MetricsSnapshot, Outcome, TimedOperation};
use retry::RetryPolicy;

struct AppState {
    /// `None` when the recognizer failed to initialize.
    extractor: Option<Extractor>,
    gazetteers: Arc<Gazetteers>,
    cache: Option<ParseCache>,
    metrics: Metrics,
}

#[derive(Deserialize)]
struct ParseParams {
    query: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    ner: String,
    gazetteers: GazetteerSizes,
}

#[derive(Serialize)]
struct GazetteerSizes {
    makes: usize,
    makes_with_models: usize,
    fuel_types: usize,
    locations: usize,
}

#[derive(Serialize)]
struct MetricsResponse {
    requests: MetricsSnapshot,
    cache: Option<CacheStats>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    let gazetteers = match &config.gazetteer_path {
        Some(path) => Arc::new(
            Gazetteers::from_json_file(path)
                .with_context(|| format!("Failed to load gazetteers from {:?}", path))?,
        ),
        None => Gazetteers::builtin(),
    };
    info!(
        makes = gazetteers.makes.len(),
        makes_with_models = gazetteers.model_makes(),
        locations = gazetteers.locations.len(),
        "Gazetteers loaded"
    );

    let extractor = init_extractor(&config, gazetteers.clone()).await;

    let state = Arc::new(AppState {
        extractor,
        gazetteers,
        cache: config
            .cache
            .enabled
            .then(|| ParseCache::new(config.cache.max_entries)),
        metrics: Metrics::new(),
    });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;

    info!("Server listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if config.log_json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Build the recognizer client and wait for it to come up. On failure the
/// service still starts and `/parse` answers 503.
async fn init_extractor(config: &AppConfig, gazetteers: Arc<Gazetteers>) -> Option<Extractor> {
    let recognizer = match HttpRecognizer::new(
        config.ner.base_url.clone(),
        Duration::from_secs(config.ner.request_timeout_secs),
    ) {
        Ok(recognizer) => recognizer,
        Err(e) => {
            error!(error = %e, "Failed to create NER client");
            return None;
        }
    };

    let extractor = Extractor::new(Arc::new(recognizer), gazetteers);

    if config.ner.probe_on_startup {
        let policy = RetryPolicy::from_config(&config.retry);
        if let Err(e) = policy.run("ner_probe", || extractor.ready()).await {
            error!(
                url = %config.ner.base_url,
                error = %e,
                "NER service not available, parse requests will be refused"
            );
            return None;
        }
    }

    info!(url = %config.ner.base_url, "NER service ready");
    Some(extractor)
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/parse", get(parse_query))
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn parse_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ParseParams>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let Some(extractor) = &state.extractor else {
        state.metrics.record(Outcome::Unavailable);
        return Err(ApiError::Unavailable(
            "NER model not loaded".to_string(),
        ));
    };

    let query = params.query.unwrap_or_default();
    if query.trim().is_empty() {
        state.metrics.record(Outcome::Rejected);
        return Err(ApiError::BadRequest("Query parameter missing".to_string()));
    }

    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("parse", %request_id);

    async {
        info!(query = %query, "Received query");

        if let Some(cached) = state.cache.as_ref().and_then(|c| c.get(&query)) {
            state.metrics.record_parse(Duration::ZERO, &cached);
            return Ok(Json(cached));
        }

        let timer = TimedOperation::start();
        match extractor.extract(&query).await {
            Ok(result) => {
                state.metrics.record_parse(timer.elapsed(), &result);
                if let Some(cache) = &state.cache {
                    cache.insert(&query, result.clone());
                }
                Ok(Json(result))
            }
            Err(e) => {
                warn!(error = %e, "Extraction failed");
                let err = ApiError::from(e);
                state.metrics.record(match err {
                    ApiError::BadRequest(_) => Outcome::Rejected,
                    _ => Outcome::Unavailable,
                });
                Err(err)
            }
        }
    }
    .instrument(span)
    .await
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ner = match &state.extractor {
        None => "not loaded".to_string(),
        Some(extractor) => match extractor.ready().await {
            Ok(()) => "ok".to_string(),
            Err(e) => format!("error: {e:#}"),
        },
    };

    Json(HealthResponse {
        status: if ner == "ok" { "ok" } else { "degraded" },
        ner,
        gazetteers: GazetteerSizes {
            makes: state.gazetteers.makes.len(),
            makes_with_models: state.gazetteers.model_makes(),
            fuel_types: state.gazetteers.fuel_types.len(),
            locations: state.gazetteers.locations.len(),
        },
    })
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        requests: state.metrics.snapshot(),
        cache: state.cache.as_ref().map(ParseCache::stats),
    })
}
