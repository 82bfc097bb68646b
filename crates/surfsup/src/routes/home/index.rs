pub const ROUTE_LISTING: &str = "Welcome to the Hawaii Climate API!
Available Routes:
/api/v1.0/precipitation
/api/v1.0/stations
/api/v1.0/tobs
/api/v1.0/<start>
/api/v1.0/<start>/<end>
";

pub async fn index_handler() -> &'static str {
    ROUTE_LISTING
}
