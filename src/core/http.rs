//! HTTP endpoint server using Axum

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, Request, State,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::chart::{ChartError, ChartSession, ChartSnapshot, SharedChart};
use crate::config::ServerConfig;
use crate::indicators::volatility::bollinger::{calculate_bollinger_bands, validate_config};
use crate::metrics::Metrics;
use crate::models::indicators::{Bar, BollingerConfig, PriceSource};
use crate::models::style::BollingerStyles;
use crate::series::Series;
use crate::services::market_data::{MarketDataProvider, StaticFileProvider};

pub const SERVICE_NAME: &str = "findscan-chart";

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub chart: Arc<SharedChart>,
}

impl AppState {
    /// Build state around a loaded series with default inputs and styles.
    pub fn new(series: Series, metrics: Arc<Metrics>) -> Result<Self, ChartError> {
        let session = ChartSession::new(
            series,
            BollingerConfig::default(),
            BollingerStyles::default(),
        )?;

        Ok(Self {
            metrics,
            start_time: Arc::new(Instant::now()),
            chart: Arc::new(SharedChart::new(session)),
        })
    }
}

/// `degraded` when the session has no bars to draw, `healthy` otherwise.
pub fn health_status(bars: usize) -> &'static str {
    if bars == 0 {
        "degraded"
    } else {
        "healthy"
    }
}

/// Error body returned to the settings editor.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }
}

impl From<ChartError> for ApiError {
    fn from(err: ChartError) -> Self {
        match err {
            ChartError::Indicator(_) | ChartError::Style(_) => Self::unprocessable(err.to_string()),
            ChartError::Task(_) => {
                error!(error = %err, "Band computation failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: err.to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let uptime_seconds = state.start_time.elapsed().as_secs();
    let bars = state.chart.series().await.len();
    Ok(Json(json!({
        "status": health_status(bars),
        "uptime_seconds": uptime_seconds,
        "service": SERVICE_NAME,
        "bars": bars
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BollingerQuery {
    length: Option<usize>,
    std_dev: Option<f64>,
    offset: Option<i64>,
    source: Option<PriceSource>,
}

impl BollingerQuery {
    fn into_config(self) -> BollingerConfig {
        let defaults = BollingerConfig::default();
        BollingerConfig {
            length: self.length.unwrap_or(defaults.length),
            std_dev: self.std_dev.unwrap_or(defaults.std_dev),
            offset: self.offset.unwrap_or(defaults.offset),
            ma_type: defaults.ma_type,
            source: self.source.unwrap_or(defaults.source),
        }
    }
}

/// The loaded bar series
async fn get_bars(State(state): State<AppState>) -> Json<Vec<Bar>> {
    Json(state.chart.series().await.bars().to_vec())
}

/// Count a config that never made it past decoding and answer like any other
/// invalid edit.
fn reject_undecodable(state: &AppState, reason: String) -> ApiError {
    warn!(error = %reason, "Rejected undecodable Bollinger inputs");
    state.metrics.bollinger_rejected_configs_total.inc();
    ApiError::unprocessable(reason)
}

/// Compute bands for ad-hoc parameters without touching the session
async fn get_bollinger(
    State(state): State<AppState>,
    params: Result<Query<BollingerQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params.map_err(|e| reject_undecodable(&state, e.body_text()))?;
    let config = params.into_config();
    if let Err(e) = validate_config(&config) {
        state.metrics.bollinger_rejected_configs_total.inc();
        return Err(ApiError::unprocessable(e.to_string()));
    }

    let series = state.chart.series().await;
    let points = calculate_bollinger_bands(series.bars(), &config)
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;
    state.metrics.bollinger_computations_total.inc();

    Ok(Json(json!({
        "inputs": config,
        "points": points
    })))
}

/// Current chart snapshot
async fn get_chart(State(state): State<AppState>) -> Json<ChartSnapshot> {
    Json(state.chart.snapshot().await)
}

/// Replace the indicator inputs
async fn update_inputs(
    State(state): State<AppState>,
    inputs: Result<Json<BollingerConfig>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(inputs) = inputs.map_err(|e| reject_undecodable(&state, e.body_text()))?;
    let applied = match state.chart.update_inputs(inputs).await {
        Ok(applied) => applied,
        Err(e) => {
            if matches!(e, ChartError::Indicator(_)) {
                state.metrics.bollinger_rejected_configs_total.inc();
            }
            return Err(e.into());
        }
    };
    state.metrics.bollinger_computations_total.inc();

    let snapshot = state.chart.snapshot().await;
    Ok(Json(json!({
        "applied": applied,
        "chart": snapshot
    })))
}

/// Add the indicator to the chart
async fn add_indicator(State(state): State<AppState>) -> Json<ChartSnapshot> {
    state.chart.set_enabled(true).await;
    Json(state.chart.snapshot().await)
}

/// Remove the indicator from the chart; inputs and styles are kept
async fn remove_indicator(State(state): State<AppState>) -> Json<ChartSnapshot> {
    state.chart.set_enabled(false).await;
    Json(state.chart.snapshot().await)
}

/// Replace the overlay styles
async fn update_styles(
    State(state): State<AppState>,
    Json(styles): Json<BollingerStyles>,
) -> Result<Json<ChartSnapshot>, ApiError> {
    state.chart.update_styles(styles).await?;
    Ok(Json(state.chart.snapshot().await))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/bars", get(get_bars))
        .route("/api/bollinger", get(get_bollinger))
        .route("/api/chart", get(get_chart))
        .route(
            "/api/chart/indicator",
            post(add_indicator).delete(remove_indicator),
        )
        .route("/api/chart/inputs", put(update_inputs))
        .route("/api/chart/styles", put(update_styles))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);

    let provider = StaticFileProvider::new(&config.data_path);
    let series = provider.load_series().map_err(|e| {
        warn!(path = %provider.path().display(), error = %e, "Failed to load OHLCV data");
        e
    })?;

    let state = AppState::new(series, metrics)?;
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "HTTP server listening on port {}", config.port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        config.port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
