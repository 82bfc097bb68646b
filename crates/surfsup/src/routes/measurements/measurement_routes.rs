use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::debug;
use std::sync::Arc;

use crate::{
    routes::internal_error, trailing_window, AppState, DateRange, PrecipitationByDate,
    TemperatureObservation, TemperatureStats,
};

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation by date over the last 12 months of data", body = PrecipitationByDate),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the climate dataset")
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PrecipitationByDate>, (StatusCode, String)> {
    let Some(window) = trailing_window(state.climate_db.as_ref())
        .await
        .map_err(internal_error)?
    else {
        return Ok(Json(PrecipitationByDate::default()));
    };
    debug!("precipitation window starts at {}", window.start);

    let rows = state
        .climate_db
        .precipitation(&window)
        .await
        .map_err(internal_error)?;

    Ok(Json(PrecipitationByDate::from(rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Temperature observations of the most active station over the last 12 months of data", body = Vec<TemperatureObservation>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the climate dataset")
    ))]
pub async fn temperature_observations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureObservation>>, (StatusCode, String)> {
    let Some(window) = trailing_window(state.climate_db.as_ref())
        .await
        .map_err(internal_error)?
    else {
        return Ok(Json(vec![]));
    };
    debug!(
        "tobs window for station {} starts at {}",
        state.active_station, window.start
    );

    let observations = state
        .climate_db
        .temperature_observations(state.active_station.clone(), &window)
        .await
        .map_err(internal_error)?;

    Ok(Json(observations))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    params(
        ("start" = String, Path, description = "Earliest observation date (YYYY-MM-DD), inclusive"),
    ),
    responses(
        (status = OK, description = "Min, average and max temperature from start onwards", body = TemperatureStats),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the climate dataset")
    ))]
pub async fn temperature_stats_since(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureStats>, (StatusCode, String)> {
    let stats = state
        .climate_db
        .temperature_stats(&DateRange::since(start))
        .await
        .map_err(internal_error)?;

    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    params(
        ("start" = String, Path, description = "Earliest observation date (YYYY-MM-DD), inclusive"),
        ("end" = String, Path, description = "Latest observation date (YYYY-MM-DD), inclusive"),
    ),
    responses(
        (status = OK, description = "Min, average and max temperature between start and end", body = TemperatureStats),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the climate dataset")
    ))]
pub async fn temperature_stats_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureStats>, (StatusCode, String)> {
    let stats = state
        .climate_db
        .temperature_stats(&DateRange::between(start, end))
        .await
        .map_err(internal_error)?;

    Ok(Json(stats))
}
