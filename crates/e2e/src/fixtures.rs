//! Literal test data
//!
//! Entity names created by the run carry the run stamp so parallel-ish
//! manual runs against a shared backend do not collide, and so teardown
//! can find exactly this run's project. Everything else is a fixed
//! literal asserted back verbatim.

/// Agency created in the editor
pub const AGENCY_ID: &str = "test-agency-id";
pub const AGENCY_NAME: &str = "test agency";
pub const AGENCY_URL: &str = "http://example.com";

/// Route created in the editor
pub const ROUTE_SHORT_NAME: &str = "10";
pub const ROUTE_LONG_NAME: &str = "test route";

/// Stop created in the editor; also the landmark asserted in trip-plan
/// responses after deployment.
pub const STOP_NAME: &str = "Russell Ave and Valley Dr";
pub const STOP_LAT: &str = "37.04671717";
pub const STOP_LON: &str = "-122.07529855";

/// Calendar round-trip values
pub const SERVICE_ID: &str = "test-service-id";
pub const CALENDAR_START_DATE: &str = "05/29/18";
pub const CALENDAR_END_DATE: &str = "05/29/28";

/// Schedule exception
pub const EXCEPTION_NAME: &str = "test exception";
pub const EXCEPTION_DATE: &str = "07/04/18";

/// Fare
pub const FARE_ID: &str = "test-fare-id";
pub const FARE_PRICE: &str = "1.50";
pub const FARE_CURRENCY: &str = "USD";

/// Trip pattern and timetable
pub const PATTERN_NAME: &str = "test pattern";
pub const TRIP_START_TIME: &str = "08:00:00";

/// Suffix applied before deleting a cloned entity
pub const DELETE_SUFFIX: &str = " to delete";

/// Trip-plan probe endpoints (stop coordinates and a point across town)
pub const PLAN_FROM_PLACE: &str = "37.04671717,-122.07529855";
pub const PLAN_TO_PLACE: &str = "37.04993087,-122.07245565";

pub fn project_name(stamp: &str) -> String {
    format!("e2e project {stamp}")
}

pub fn feed_source_name(stamp: &str) -> String {
    format!("e2e feed source {stamp}")
}

pub fn scratch_feed_source_name(stamp: &str) -> String {
    format!("e2e scratch feed {stamp}")
}

pub fn deployment_name(stamp: &str) -> String {
    format!("e2e deployment {stamp}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_scoped_names_embed_the_stamp() {
        let stamp = "2024-05-29T10-30-00";
        for name in [
            project_name(stamp),
            feed_source_name(stamp),
            scratch_feed_source_name(stamp),
            deployment_name(stamp),
        ] {
            assert!(name.contains(stamp), "{name}");
        }
    }

    #[test]
    fn plan_probe_starts_at_the_created_stop() {
        assert!(PLAN_FROM_PLACE.starts_with(STOP_LAT));
        assert!(PLAN_FROM_PLACE.ends_with(STOP_LON));
    }
}
