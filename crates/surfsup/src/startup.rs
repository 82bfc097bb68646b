use crate::{
    db::{self, ClimateAccess, ClimateData, Database},
    get_stations, index_handler, precipitation, routes, temperature_observations,
    temperature_stats_between, temperature_stats_since,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub climate_db: Arc<dyn ClimateData>,
    /// Station served by the temperature observations endpoint
    pub active_station: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::measurements::measurement_routes::precipitation,
        routes::measurements::measurement_routes::temperature_observations,
        routes::measurements::measurement_routes::temperature_stats_since,
        routes::measurements::measurement_routes::temperature_stats_between,
        routes::stations::station_routes::get_stations,
    ),
    components(
        schemas(
            db::PrecipitationByDate,
            db::TemperatureObservation,
            db::TemperatureStats,
        )
    ),
    tags(
        (name = "hawaii climate api", description = "a read-only RESTful api over daily station precipitation and temperature observations")
    )
)]
struct ApiDoc;

pub async fn build_app_state(
    database: Database,
    active_station: String,
) -> Result<AppState, anyhow::Error> {
    let climate_db: Arc<dyn ClimateData> = Arc::new(ClimateAccess::new(database));

    report_dataset(climate_db.as_ref(), &active_station)
        .await
        .map_err(|e| anyhow!("error reading climate dataset: {}", e))?;

    Ok(AppState {
        climate_db,
        active_station,
    })
}

/// Log what the dataset holds and flag a configured station that doesn't lead
/// the measurement-count ranking.
async fn report_dataset(
    climate_db: &dyn ClimateData,
    active_station: &str,
) -> Result<(), db::Error> {
    let stations = climate_db.stations().await?;
    info!("  Stations: {}", stations.len());

    match climate_db.latest_date().await? {
        Some(latest) => info!("  Latest observation: {}", latest),
        None => warn!("climate dataset has no measurements, window queries will be empty"),
    }

    if !stations.iter().any(|s| s.station == active_station) {
        warn!("active station {} is not a known station", active_station);
    }

    let activity = climate_db.station_activity().await?;
    match activity.first() {
        Some(top) if top.station != active_station => warn!(
            "active station {} is not the most active station, {} has {} measurements",
            active_station, top.station, top.count
        ),
        Some(top) => info!(
            "  Active station: {} ({} measurements)",
            top.station, top.count
        ),
        None => {}
    }

    Ok(())
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(get_stations))
        .route("/api/v1.0/tobs", get(temperature_observations))
        .route("/api/v1.0/{start}", get(temperature_stats_since))
        .route("/api/v1.0/{start}/{end}", get(temperature_stats_between))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request", "new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
