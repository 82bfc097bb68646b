use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};
use std::collections::BTreeMap;
use time::{macros::format_description, Date, Duration};
use utoipa::ToSchema;

use super::{Database, Error, MEASUREMENT_TABLE, STATION_TABLE};

/// Station reported by the temperature observations endpoint.
///
/// Measurement counts rank `USC00519281` first in the Hawaii dataset; the
/// value is kept fixed rather than recomputed per request.
pub const MOST_ACTIVE_STATION: &str = "USC00519281";

/// Length of the trailing window ending at the latest observation date.
pub const WINDOW_DAYS: i64 = 365;

/// Inclusive date bounds compared against the stored ISO date text.
///
/// Bounds are not validated; a malformed bound simply matches no rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: Option<String>,
}

impl DateRange {
    pub fn since(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: None,
        }
    }

    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: Some(end.into()),
        }
    }

    fn push_filter(&self, query: &mut QueryBuilder<'_, Sqlite>) {
        query.push(" WHERE date >= ").push_bind(self.start.clone());
        if let Some(end) = &self.end {
            query.push(" AND date <= ").push_bind(end.clone());
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Station {
    pub station: String,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

/// Number of measurements recorded by a station
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StationActivity {
    pub station: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Precipitation {
    pub date: String,
    pub prcp: Option<f64>,
}

/// Precipitation keyed by observation date.
///
/// Several stations report on the same day; the row yielded last wins.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, ToSchema)]
pub struct PrecipitationByDate(pub BTreeMap<String, Option<f64>>);

impl From<Vec<Precipitation>> for PrecipitationByDate {
    fn from(rows: Vec<Precipitation>) -> Self {
        let mut by_date = BTreeMap::new();
        for row in rows {
            by_date.insert(row.date, row.prcp);
        }
        Self(by_date)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow, ToSchema)]
pub struct TemperatureObservation {
    pub date: String,
    pub tobs: Option<f64>,
}

/// Min/avg/max of observed temperature; all `None` over an empty set
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, sqlx::FromRow, ToSchema)]
pub struct TemperatureStats {
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
    #[serde(rename = "TAVG")]
    pub tavg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
}

#[async_trait]
pub trait ClimateData: Sync + Send {
    /// Latest observation date across all measurements, `None` when empty
    async fn latest_date(&self) -> Result<Option<String>, Error>;
    async fn precipitation(&self, range: &DateRange) -> Result<Vec<Precipitation>, Error>;
    async fn temperature_observations(
        &self,
        station_id: String,
        range: &DateRange,
    ) -> Result<Vec<TemperatureObservation>, Error>;
    async fn temperature_stats(&self, range: &DateRange) -> Result<TemperatureStats, Error>;
    async fn station_ids(&self) -> Result<Vec<String>, Error>;
    async fn stations(&self) -> Result<Vec<Station>, Error>;
    /// Stations ranked by measurement count, most active first
    async fn station_activity(&self) -> Result<Vec<StationActivity>, Error>;
}

/// First day of the trailing window ending on `latest` (inclusive).
pub fn window_start(latest: &str) -> Result<String, Error> {
    let latest_date = Date::parse(latest, format_description!("[year]-[month]-[day]"))?;
    let start = latest_date
        .checked_sub(Duration::days(WINDOW_DAYS))
        .ok_or_else(|| Error::DateRange(latest.to_owned()))?;
    Ok(start.format(format_description!("[year]-[month]-[day]"))?)
}

/// The trailing window of the dataset, `None` when there are no measurements.
pub async fn trailing_window(climate_db: &dyn ClimateData) -> Result<Option<DateRange>, Error> {
    match climate_db.latest_date().await? {
        Some(latest) => Ok(Some(DateRange::since(window_start(&latest)?))),
        None => Ok(None),
    }
}

pub struct ClimateAccess {
    db: Database,
}

impl ClimateAccess {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClimateData for ClimateAccess {
    async fn latest_date(&self) -> Result<Option<String>, Error> {
        let latest: Option<String> =
            sqlx::query_scalar(&format!("SELECT MAX(date) FROM {}", MEASUREMENT_TABLE))
                .fetch_one(self.db.pool())
                .await?;
        Ok(latest)
    }

    async fn precipitation(&self, range: &DateRange) -> Result<Vec<Precipitation>, Error> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT date, CAST(prcp AS REAL) AS prcp FROM {}",
            MEASUREMENT_TABLE
        ));
        range.push_filter(&mut query);

        Ok(query
            .build_query_as::<Precipitation>()
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn temperature_observations(
        &self,
        station_id: String,
        range: &DateRange,
    ) -> Result<Vec<TemperatureObservation>, Error> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT date, CAST(tobs AS REAL) AS tobs FROM {}",
            MEASUREMENT_TABLE
        ));
        range.push_filter(&mut query);
        query.push(" AND station = ").push_bind(station_id);

        Ok(query
            .build_query_as::<TemperatureObservation>()
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn temperature_stats(&self, range: &DateRange) -> Result<TemperatureStats, Error> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT CAST(MIN(tobs) AS REAL) AS tmin, AVG(tobs) AS tavg, CAST(MAX(tobs) AS REAL) AS tmax FROM {}",
            MEASUREMENT_TABLE
        ));
        range.push_filter(&mut query);

        Ok(query
            .build_query_as::<TemperatureStats>()
            .fetch_one(self.db.pool())
            .await?)
    }

    async fn station_ids(&self) -> Result<Vec<String>, Error> {
        let ids: Vec<String> =
            sqlx::query_scalar(&format!("SELECT station FROM {}", STATION_TABLE))
                .fetch_all(self.db.pool())
                .await?;
        Ok(ids)
    }

    async fn stations(&self) -> Result<Vec<Station>, Error> {
        let stations = sqlx::query_as::<_, Station>(&format!(
            "SELECT station, name,
                    CAST(latitude AS REAL) AS latitude,
                    CAST(longitude AS REAL) AS longitude,
                    CAST(elevation AS REAL) AS elevation
             FROM {}",
            STATION_TABLE
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(stations)
    }

    async fn station_activity(&self) -> Result<Vec<StationActivity>, Error> {
        let activity = sqlx::query_as::<_, StationActivity>(&format!(
            "SELECT station, COUNT(*) AS count
             FROM {}
             GROUP BY station
             ORDER BY count DESC, station ASC",
            MEASUREMENT_TABLE
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(activity)
    }
}
