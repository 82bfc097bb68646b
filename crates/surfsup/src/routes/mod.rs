pub mod home;
pub mod measurements;
pub mod stations;

pub use home::*;
pub use measurements::*;
pub use stations::*;

use axum::http::StatusCode;
use log::error;

use crate::db;

pub(crate) fn internal_error(err: db::Error) -> (StatusCode, String) {
    error!("error querying climate dataset: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        String::from("Failed to query climate dataset"),
    )
}
