//! Trip pattern and timetable workflows

use futures::future::{BoxFuture, FutureExt};

use editor_e2e_harness::{HarnessResult, RunContext};

use super::editor::{reload_entity_tab, select_entity};
use crate::fixtures;

const PATTERN_TAB: &str = "[data-test-id=\"editor-pattern-tab-button\"]";
const NEW_PATTERN_BUTTON: &str = "[data-test-id=\"new-pattern-button\"]";
const PATTERN_NAME_INPUT: &str = "[data-test-id=\"pattern-name-input-container\"] input";
const SAVE_PATTERN_BUTTON: &str = "[data-test-id=\"save-pattern-button\"]";
const PATTERN_LIST: &str = "[data-test-id=\"pattern-list\"]";
const ADD_STOP_BY_NAME_BUTTON: &str = "[data-test-id=\"add-stop-by-name-button\"]";
const STOP_PICKER_INPUT: &str = "[data-test-id=\"pattern-stop-picker\"] input";
const STOP_PICKER_FIRST_RESULT: &str = "[data-test-id=\"pattern-stop-picker\"] .dropdown-item";
const USE_TIMETABLES_BUTTON: &str = "[data-test-id=\"use-timetables-button\"]";
const EDIT_TIMETABLES_BUTTON: &str = "[data-test-id=\"edit-timetables-button\"]";
const ADD_TRIP_BUTTON: &str = "[data-test-id=\"add-new-trip-button\"]";
const TIMETABLE_FIRST_CELL: &str = "[data-test-id=\"timetable-grid\"] .editable-cell";
const SAVE_TRIPS_BUTTON: &str = "[data-test-id=\"save-trips-button\"]";
const TIMETABLE_GRID: &str = "[data-test-id=\"timetable-grid\"]";

/// Add a trip pattern to the test route and attach the test stop to it
pub fn create_pattern(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let session = ctx.session()?;

        reload_entity_tab(session, "route").await?;
        select_entity(session, fixtures::ROUTE_LONG_NAME).await?;
        session.click(PATTERN_TAB).await?;
        session.click(NEW_PATTERN_BUTTON).await?;
        session
            .type_text(PATTERN_NAME_INPUT, fixtures::PATTERN_NAME, true)
            .await?;

        session.click(ADD_STOP_BY_NAME_BUTTON).await?;
        session
            .type_text(STOP_PICKER_INPUT, fixtures::STOP_NAME, true)
            .await?;
        session.click(STOP_PICKER_FIRST_RESULT).await?;

        session.click(SAVE_PATTERN_BUTTON).await?;
        session
            .expect_text(PATTERN_LIST, fixtures::PATTERN_NAME)
            .await?;
        Ok(())
    }
    .boxed()
}

/// Switch the pattern to timetables and add one trip on the test calendar
pub fn add_timetable_trip(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let session = ctx.session()?;

        reload_entity_tab(session, "route").await?;
        select_entity(session, fixtures::ROUTE_LONG_NAME).await?;
        session.click(PATTERN_TAB).await?;
        session
            .expect_text(PATTERN_LIST, fixtures::PATTERN_NAME)
            .await?;

        session.click(USE_TIMETABLES_BUTTON).await?;
        session.click(EDIT_TIMETABLES_BUTTON).await?;
        session.click(ADD_TRIP_BUTTON).await?;
        session
            .type_text(TIMETABLE_FIRST_CELL, fixtures::TRIP_START_TIME, true)
            .await?;
        session.press_key(TIMETABLE_FIRST_CELL, "Tab").await?;
        session.click(SAVE_TRIPS_BUTTON).await?;

        session.reload().await?;
        session.click(EDIT_TIMETABLES_BUTTON).await?;
        session
            .expect_text(TIMETABLE_GRID, fixtures::TRIP_START_TIME)
            .await?;
        Ok(())
    }
    .boxed()
}
