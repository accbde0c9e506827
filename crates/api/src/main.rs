use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use valgauge_core::domain::sample::sample_snapshot;
use valgauge_core::domain::snapshot::{ScoredSnapshot, StockSnapshot};
use valgauge_core::ingest::pipeline::{PipelineOptions, StockListPipeline};
use valgauge_core::ingest::types::StockListItem;
use valgauge_core::scoring::ScoringError;

const MISSING_KEYS_MESSAGE: &str = "API keys are not configured.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = valgauge_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pipeline = if settings.has_provider_credentials() {
        match StockListPipeline::from_settings(&settings, PipelineOptions::from_env()) {
            Ok(p) => Some(Arc::new(p)),
            Err(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "pipeline setup failed; starting API in degraded mode");
                None
            }
        }
    } else {
        tracing::error!("provider API keys missing; starting API in degraded mode");
        None
    };

    let app = router(AppState { pipeline });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/stock-list", get(get_stock_list))
        .route("/stocks/:ticker", get(get_stock))
        .route("/stocks/:ticker/analysis", get(get_stock_analysis))
        .route("/analysis", axum::routing::post(post_analysis))
        .route("/analysis/sample", get(get_sample_analysis))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    pipeline: Option<Arc<StockListPipeline>>,
}

impl AppState {
    fn pipeline(&self) -> Result<&StockListPipeline, ApiError> {
        self.pipeline
            .as_deref()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, MISSING_KEYS_MESSAGE.to_string()))
    }
}

type ApiError = (StatusCode, String);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiAnalysis {
    generated_at: DateTime<Utc>,
    snapshot: ScoredSnapshot,
}

impl ApiAnalysis {
    fn from_snapshot(raw: &StockSnapshot) -> Result<Self, ScoringError> {
        let snapshot = raw.analyze()?;
        tracing::info!(
            ticker = %snapshot.ticker(),
            overall = snapshot.overall_risk_value(),
            summary = %snapshot.bucket_counts().describe(),
            "analysis complete"
        );
        Ok(Self {
            generated_at: Utc::now(),
            snapshot,
        })
    }
}

async fn get_stock_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<StockListItem>>, ApiError> {
    let pipeline = state.pipeline()?;
    Ok(Json(pipeline.run().await))
}

async fn get_stock(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<StockListItem>, ApiError> {
    let pipeline = state.pipeline()?;
    let item = pipeline.fetch_ticker(&ticker).await.map_err(|e| {
        tracing::warn!(%ticker, error = %format!("{e:#}"), "ticker unavailable");
        (StatusCode::NOT_FOUND, format!("{ticker} is unavailable"))
    })?;
    Ok(Json(item))
}

async fn get_stock_analysis(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiAnalysis>, ApiError> {
    let Json(item) = get_stock(State(state), Path(ticker)).await?;

    let raw = item.to_snapshot().ok_or((
        StatusCode::NOT_FOUND,
        format!("{} has no industry benchmark", item.ticker),
    ))?;

    let analysis = ApiAnalysis::from_snapshot(&raw).map_err(|e| {
        let err = anyhow::Error::new(e.clone());
        sentry_anyhow::capture_anyhow(&err);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(analysis))
}

async fn get_sample_analysis() -> Result<Json<ApiAnalysis>, ApiError> {
    let analysis = ApiAnalysis::from_snapshot(&sample_snapshot())
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(analysis))
}

async fn post_analysis(Json(raw): Json<StockSnapshot>) -> Result<Json<ApiAnalysis>, ApiError> {
    let analysis = ApiAnalysis::from_snapshot(&raw).map_err(|e| match e {
        ScoringError::InvalidInput(_) => (StatusCode::BAD_REQUEST, e.to_string()),
    })?;
    Ok(Json(analysis))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &valgauge_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
