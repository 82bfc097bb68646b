use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::{routes::internal_error, AppState};

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Identifiers of every station in the dataset", body = Vec<String>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the climate dataset")
    ))]
pub async fn get_stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    let station_ids = state
        .climate_db
        .station_ids()
        .await
        .map_err(internal_error)?;

    Ok(Json(station_ids))
}
