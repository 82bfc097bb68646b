use crate::helpers::{spawn_app, MockClimateAccess};
use axum::http::StatusCode;
use serde_json::{from_str, Value};
use std::{collections::BTreeMap, sync::Arc};
use surfsup::{
    DateRange, Error, Precipitation, TemperatureObservation, TemperatureStats,
    MOST_ACTIVE_STATION, ROUTE_LISTING,
};

fn precipitation_row(date: &str, prcp: Option<f64>) -> Precipitation {
    Precipitation {
        date: date.to_string(),
        prcp,
    }
}

#[tokio::test]
async fn index_lists_available_routes() {
    let test_app = spawn_app(Arc::new(MockClimateAccess::new())).await;

    let (status, body) = test_app.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ROUTE_LISTING);
    for route in [
        "/api/v1.0/precipitation",
        "/api/v1.0/stations",
        "/api/v1.0/tobs",
        "/api/v1.0/<start>",
        "/api/v1.0/<start>/<end>",
    ] {
        assert!(body.contains(route), "missing {}", route);
    }
}

#[tokio::test]
async fn precipitation_queries_trailing_year_of_latest_date() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_latest_date()
        .times(1)
        .returning(|| Ok(Some("2017-08-23".to_string())));
    climate_data
        .expect_precipitation()
        .withf(|range| range.start == "2016-08-23" && range.end.is_none())
        .times(1)
        .returning(|_| {
            Ok(vec![
                precipitation_row("2016-08-23", Some(1.79)),
                precipitation_row("2016-08-24", None),
                precipitation_row("2016-08-23", Some(0.05)),
            ])
        });

    let test_app = spawn_app(Arc::new(climate_data)).await;
    let (status, body) = test_app.get("/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::OK);
    let by_date: BTreeMap<String, Option<f64>> = from_str(&body).unwrap();
    assert_eq!(by_date.len(), 2);
    assert_eq!(by_date["2016-08-23"], Some(0.05));
    assert_eq!(by_date["2016-08-24"], None);
}

#[tokio::test]
async fn precipitation_is_empty_without_measurements() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_latest_date()
        .times(1)
        .returning(|| Ok(None));
    climate_data.expect_precipitation().times(0);

    let test_app = spawn_app(Arc::new(climate_data)).await;
    let (status, body) = test_app.get("/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{}");
}

#[tokio::test]
async fn stations_returns_identifiers_in_dataset_order() {
    let mut climate_data = MockClimateAccess::new();
    climate_data.expect_station_ids().times(1).returning(|| {
        Ok(vec![
            "USC00519397".to_string(),
            "USC00513117".to_string(),
            "USC00514830".to_string(),
        ])
    });

    let test_app = spawn_app(Arc::new(climate_data)).await;
    let (status, body) = test_app.get("/api/v1.0/stations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"["USC00519397","USC00513117","USC00514830"]"#);
}

#[tokio::test]
async fn tobs_uses_most_active_station_and_trailing_window() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_latest_date()
        .times(1)
        .returning(|| Ok(Some("2017-08-23".to_string())));
    climate_data
        .expect_temperature_observations()
        .withf(|station_id, range| {
            station_id.as_str() == MOST_ACTIVE_STATION && *range == DateRange::since("2016-08-23")
        })
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                TemperatureObservation {
                    date: "2016-08-23".to_string(),
                    tobs: Some(77.0),
                },
                TemperatureObservation {
                    date: "2016-08-24".to_string(),
                    tobs: Some(77.0),
                },
            ])
        });

    let test_app = spawn_app(Arc::new(climate_data)).await;
    let (status, body) = test_app.get("/api/v1.0/tobs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"[{"date":"2016-08-23","tobs":77.0},{"date":"2016-08-24","tobs":77.0}]"#
    );
}

#[tokio::test]
async fn tobs_is_empty_without_measurements() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_latest_date()
        .times(1)
        .returning(|| Ok(None));
    climate_data.expect_temperature_observations().times(0);

    let test_app = spawn_app(Arc::new(climate_data)).await;
    let (status, body) = test_app.get("/api/v1.0/tobs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn stats_since_start_passes_start_through() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_temperature_stats()
        .withf(|range| *range == DateRange::since("2017-01-01"))
        .times(1)
        .returning(|_| {
            Ok(TemperatureStats {
                tmin: Some(58.0),
                tavg: Some(74.5),
                tmax: Some(87.0),
            })
        });

    let test_app = spawn_app(Arc::new(climate_data)).await;
    let (status, body) = test_app.get("/api/v1.0/2017-01-01").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"TMIN":58.0,"TAVG":74.5,"TMAX":87.0}"#);
}

#[tokio::test]
async fn stats_between_passes_both_bounds_through() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_temperature_stats()
        .withf(|range| *range == DateRange::between("2017-01-01", "2017-01-31"))
        .times(1)
        .returning(|_| Ok(TemperatureStats::default()));

    let test_app = spawn_app(Arc::new(climate_data)).await;
    let (status, body) = test_app.get("/api/v1.0/2017-01-01/2017-01-31").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"TMIN":null,"TAVG":null,"TMAX":null}"#);
}

#[tokio::test]
async fn unparseable_start_is_not_rejected() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_temperature_stats()
        .withf(|range| range.start == "yesterday" && range.end.is_none())
        .times(1)
        .returning(|_| Ok(TemperatureStats::default()));

    let test_app = spawn_app(Arc::new(climate_data)).await;
    let (status, body) = test_app.get("/api/v1.0/yesterday").await;

    assert_eq!(status, StatusCode::OK);
    let stats: Value = from_str(&body).unwrap();
    assert!(stats["TMIN"].is_null());
    assert!(stats["TAVG"].is_null());
    assert!(stats["TMAX"].is_null());
}

#[tokio::test]
async fn static_routes_win_over_start_parameter() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_station_ids()
        .times(1)
        .returning(|| Ok(vec![]));
    climate_data.expect_temperature_stats().times(0);

    let test_app = spawn_app(Arc::new(climate_data)).await;
    let (status, body) = test_app.get("/api/v1.0/stations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn dataset_failure_is_a_server_error() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_station_ids()
        .times(1)
        .returning(|| Err(Error::DataUnavailable("disk went away".to_string())));

    let test_app = spawn_app(Arc::new(climate_data)).await;
    let (status, body) = test_app.get("/api/v1.0/stations").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("disk went away"));
}

#[tokio::test]
async fn malformed_latest_date_is_a_server_error() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_latest_date()
        .times(1)
        .returning(|| Ok(Some("08/23/2017".to_string())));
    climate_data.expect_precipitation().times(0);

    let test_app = spawn_app(Arc::new(climate_data)).await;
    let (status, _) = test_app.get("/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn docs_are_served() {
    let test_app = spawn_app(Arc::new(MockClimateAccess::new())).await;

    let (status, _) = test_app.get("/docs").await;

    assert_eq!(status, StatusCode::OK);
}
