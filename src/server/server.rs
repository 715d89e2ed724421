use anyhow::Result;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::error;

use crate::chart_store::{ChartScope, ChartStore};
use crate::series::{SeriesAssembler, SeriesQuery};
use chrono::NaiveDate;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub tracks: usize,
    pub regions: usize,
    pub global_entries: usize,
    pub region_entries: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        tracks: state.chart_store.get_tracks_count(),
        regions: state.chart_store.get_regions_count(),
        global_entries: state.chart_store.get_global_entries_count(),
        region_entries: state.chart_store.get_region_entries_count(),
    };
    Json(stats)
}

async fn post_track_series(
    State(assembler): State<GuardedSeriesAssembler>,
    Json(query): Json<SeriesQuery>,
) -> Response {
    match assembler.assemble(&query) {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            error!("Failed to assemble track series: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Deserialize, Debug)]
struct DailyChartParams {
    pub region: Option<String>,
}

async fn get_daily_chart(
    State(chart_store): State<GuardedChartStore>,
    Path(date): Path<String>,
    Query(params): Query<DailyChartParams>,
) -> Response {
    let date = match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    let scope = ChartScope::resolve(params.region.as_deref());
    match chart_store.get_daily_chart(&scope, date) {
        Ok(rows) => Json(rows).into_response(),
        Err(err) => {
            error!("Failed to load daily chart: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_tracks(State(chart_store): State<GuardedChartStore>) -> Response {
    match chart_store.list_tracks() {
        Ok(tracks) => Json(tracks).into_response(),
        Err(err) => {
            error!("Failed to list tracks: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_track(
    State(chart_store): State<GuardedChartStore>,
    Path(id): Path<String>,
) -> Response {
    match chart_store.get_track(&id) {
        Ok(Some(track)) => Json(track).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to load track: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_regions(State(chart_store): State<GuardedChartStore>) -> Response {
    match chart_store.list_regions() {
        Ok(regions) => Json(regions).into_response(),
        Err(err) => {
            error!("Failed to list regions: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

impl ServerState {
    fn new(config: ServerConfig, chart_store: Arc<dyn ChartStore>) -> ServerState {
        let series_assembler = Arc::new(SeriesAssembler::new(chart_store.clone()));
        ServerState {
            config,
            start_time: Instant::now(),
            chart_store,
            series_assembler,
        }
    }
}

pub fn make_app(config: ServerConfig, chart_store: Arc<dyn ChartStore>) -> Result<Router> {
    let state = ServerState::new(config, chart_store);

    let charts_routes: Router = Router::new()
        .route("/series", post(post_track_series))
        .route("/daily/{date}", get(get_daily_chart))
        .with_state(state.clone());

    let catalog_routes: Router = Router::new()
        .route("/tracks", get(get_tracks))
        .route("/track/{id}", get(get_track))
        .route("/regions", get(get_regions))
        .with_state(state.clone());

    let app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/v1/charts", charts_routes)
        .nest("/v1", catalog_routes)
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

pub async fn run_server(chart_store: Arc<dyn ChartStore>, config: ServerConfig) -> Result<()> {
    let port = config.port;
    let app = make_app(config, chart_store)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
