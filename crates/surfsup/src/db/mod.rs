mod climate_data;
mod sqlite;

pub use climate_data::*;
pub use sqlite::*;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Climate dataset unavailable: {0}")]
    DataUnavailable(String),
    #[error("Failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Failed to parse date string: {0}")]
    DateParse(#[from] time::error::Parse),
    #[error("Failed to format date string: {0}")]
    DateFormat(#[from] time::error::Format),
    #[error("Date window out of range for: {0}")]
    DateRange(String),
}
