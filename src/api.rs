//! api.rs
//! HTTP routes: /health, /kpis, /map/* for the map view, /rekap/* for the
//! chart view, /data/* for raw access and uploads. Static frontend under
//! web/ is served as the fallback.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir};
use tracing::info;

use crate::types::{DataState, GeoCfg};
use crate::{ingest, peta, rekap};

#[derive(Clone)]
pub struct ApiState {
    pub data: Arc<RwLock<DataState>>,
    pub geo: GeoCfg,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/kpis", get(kpis))
        .route("/map/points", get(map_points))
        .route("/map/heat", get(map_heat))
        .route("/map/centers", get(map_centers))
        .route("/rekap/daily", get(rekap_daily))
        .route("/rekap/weekly", get(rekap_weekly))
        .route("/data/raw", get(data_raw))
        .route("/data/upload", post(data_upload))
        .fallback_service(ServeDir::new("web"))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}

async fn kpis(State(st): State<ApiState>) -> impl IntoResponse {
    let d = st.data.read().await;
    Json(d.kpis.clone())
}

/// Query of /map/points: either a named kabupaten center or explicit
/// lat/lon, plus a radius in km. No filter returns every geocoded row.
#[derive(Debug, Deserialize)]
struct MapQuery {
    center: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    radius_km: Option<f64>,
}

async fn map_points(State(st): State<ApiState>, Query(q): Query<MapQuery>) -> impl IntoResponse {
    let d = st.data.read().await;

    let center = match (&q.center, q.lat, q.lon) {
        (_, Some(la), Some(lo)) => Some((la, lo)),
        (Some(name), _, _) => peta::center_by_name(name),
        _ => None,
    };
    let filter = peta::MapFilter { center, radius_km: q.radius_km };
    let fc = peta::points_geojson(&d.table, &filter);

    let n = fc["features"].as_array().map_or(0, Vec::len);
    let body = json!({
        "geojson": fc,
        "count": n,
        "center": center.or_else(|| peta::mean_center(&d.table)),
        "zoom": center.map(|_| peta::suggest_zoom(n)),
    });
    ([("content-type", "application/json")], body.to_string())
}

async fn map_heat(State(st): State<ApiState>) -> impl IntoResponse {
    let d = st.data.read().await;
    Json(peta::heat_points(&d.table))
}

async fn map_centers() -> impl IntoResponse {
    let centers: Vec<_> = peta::KABUPATEN
        .iter()
        .map(|(name, lat, lon)| json!({ "name": name, "lat": lat, "lon": lon }))
        .collect();
    Json(centers)
}

/// Query of /rekap/*: optional inclusive date range, same formats as the
/// data itself.
#[derive(Debug, Deserialize)]
struct RekapQuery {
    from: Option<String>,
    to: Option<String>,
}

async fn rekap_daily(State(st): State<ApiState>, Query(q): Query<RekapQuery>) -> impl IntoResponse {
    let d = st.data.read().await;
    let from = q.from.as_deref().and_then(rekap::parse_date);
    let to = q.to.as_deref().and_then(rekap::parse_date);
    let series = rekap::daily_series(&d.table, from, to);
    let summary = rekap::summarize(&series);
    Json(json!({ "series": series, "summary": summary }))
}

async fn rekap_weekly(State(st): State<ApiState>, Query(q): Query<RekapQuery>) -> impl IntoResponse {
    let d = st.data.read().await;
    let from = q.from.as_deref().and_then(rekap::parse_date);
    let to = q.to.as_deref().and_then(rekap::parse_date);
    let daily = rekap::daily_series(&d.table, from, to);
    let series = rekap::weekly_series(&daily);
    let summary = rekap::summarize(&daily);
    Json(json!({ "series": series, "summary": summary }))
}

async fn data_raw(State(st): State<ApiState>) -> impl IntoResponse {
    let d = st.data.read().await;
    Json(d.table.clone())
}

/// Replace the snapshot with an uploaded delimited file. The body is the
/// file content itself.
async fn data_upload(
    State(st): State<ApiState>,
    body: String,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let new_state = ingest::build_state(&body, &st.geo)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("{e:#}")))?;
    info!(
        "upload accepted: {} rows, {} geocoded",
        new_state.kpis.rows, new_state.kpis.geocoded
    );
    let kpis = new_state.kpis.clone();
    *st.data.write().await = new_state;
    Ok(Json(kpis))
}
