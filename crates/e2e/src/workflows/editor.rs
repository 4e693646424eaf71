//! GTFS entity editor workflows
//!
//! All of these run inside the editor session opened against the scratch
//! feed source. Field inputs follow the editor's uniform
//! `[data-test-id="<entity>-<column>-input-container"]` convention.

use futures::future::{BoxFuture, FutureExt};
use tracing::info;

use editor_e2e_harness::{HarnessError, HarnessResult, RunContext, Session};

use super::MODAL_CONFIRM;
use crate::fixtures;

const BEGIN_EDITING_BUTTON: &str = "[data-test-id=\"begin-editing-button\"]";
const EDITOR_SIDEBAR: &str = "[data-test-id=\"editor-sidebar\"]";
const ENTITY_LIST: &str = "[data-test-id=\"editor-entity-list\"]";
const NEW_ENTITY_BUTTON: &str = "[data-test-id=\"new-entity-button\"]";
const SAVE_ENTITY_BUTTON: &str = "[data-test-id=\"save-entity-button\"]";
const CLONE_ENTITY_BUTTON: &str = "[data-test-id=\"clone-entity-button\"]";
const DELETE_ENTITY_BUTTON: &str = "[data-test-id=\"delete-entity-button\"]";

fn nav_button(entity: &str) -> String {
    format!("[data-test-id=\"editor-{entity}-nav-button\"]")
}

fn field_input(entity: &str, column: &str) -> String {
    format!("[data-test-id=\"{entity}-{column}-input-container\"] input")
}

fn day_checkbox(day: &str) -> String {
    format!("[data-test-id=\"calendar-{day}-input-container\"] input[type=\"checkbox\"]")
}

/// Open the editor on the scratch feed source and start an editing
/// session (the initial snapshot is created by a backend job).
pub fn open_editor(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let scratch_id = ctx.fixtures.scratch_feed_source_id()?.to_string();
        let session = ctx.session()?;

        session.goto(&format!("/feed/{scratch_id}/edit")).await?;
        session.click(BEGIN_EDITING_BUTTON).await?;
        ctx.poller.wait_for_all_jobs(session).await?;
        session.wait_for_selector(EDITOR_SIDEBAR).await?;
        info!("editor session open");
        Ok(())
    }
    .boxed()
}

/// Create an agency and verify its fields survive a reload
pub fn create_agency(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let session = ctx.session()?;

        open_entity_tab(session, "agency").await?;
        session
            .type_text(&field_input("agency", "agency_id"), fixtures::AGENCY_ID, true)
            .await?;
        session
            .type_text(
                &field_input("agency", "agency_name"),
                fixtures::AGENCY_NAME,
                true,
            )
            .await?;
        session
            .type_text(
                &field_input("agency", "agency_url"),
                fixtures::AGENCY_URL,
                true,
            )
            .await?;
        session.click(SAVE_ENTITY_BUTTON).await?;

        reload_entity_tab(session, "agency").await?;
        session.expect_text(ENTITY_LIST, fixtures::AGENCY_NAME).await?;
        Ok(())
    }
    .boxed()
}

/// Create a route on the test agency
pub fn create_route(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let session = ctx.session()?;

        open_entity_tab(session, "route").await?;
        session
            .type_text(
                &field_input("route", "route_short_name"),
                fixtures::ROUTE_SHORT_NAME,
                true,
            )
            .await?;
        session
            .type_text(
                &field_input("route", "route_long_name"),
                fixtures::ROUTE_LONG_NAME,
                true,
            )
            .await?;
        session.click(SAVE_ENTITY_BUTTON).await?;

        reload_entity_tab(session, "route").await?;
        session
            .expect_text(ENTITY_LIST, fixtures::ROUTE_LONG_NAME)
            .await?;
        Ok(())
    }
    .boxed()
}

/// Create a stop at fixed coordinates
pub fn create_stop(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let session = ctx.session()?;

        open_entity_tab(session, "stop").await?;
        session
            .type_text(&field_input("stop", "stop_name"), fixtures::STOP_NAME, true)
            .await?;
        session
            .type_text(&field_input("stop", "stop_lat"), fixtures::STOP_LAT, true)
            .await?;
        session
            .type_text(&field_input("stop", "stop_lon"), fixtures::STOP_LON, true)
            .await?;
        session.click(SAVE_ENTITY_BUTTON).await?;

        reload_entity_tab(session, "stop").await?;
        session.expect_text(ENTITY_LIST, fixtures::STOP_NAME).await?;
        Ok(())
    }
    .boxed()
}

/// Create a calendar, reload the page, and verify every field reads back
/// exactly as entered.
pub fn calendar_round_trip(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let session = ctx.session()?;

        open_entity_tab(session, "calendar").await?;
        session
            .type_text(
                &field_input("calendar", "service_id"),
                fixtures::SERVICE_ID,
                true,
            )
            .await?;
        session.click(&day_checkbox("monday")).await?;
        session.click(&day_checkbox("tuesday")).await?;
        session
            .type_text(
                &field_input("calendar", "start_date"),
                fixtures::CALENDAR_START_DATE,
                true,
            )
            .await?;
        session
            .type_text(
                &field_input("calendar", "end_date"),
                fixtures::CALENDAR_END_DATE,
                true,
            )
            .await?;
        session.click(SAVE_ENTITY_BUTTON).await?;

        reload_entity_tab(session, "calendar").await?;
        session.expect_text(ENTITY_LIST, fixtures::SERVICE_ID).await?;
        select_entity(session, fixtures::SERVICE_ID).await?;

        let service_id = session
            .input_value(&field_input("calendar", "service_id"))
            .await?;
        let start_date = session
            .input_value(&field_input("calendar", "start_date"))
            .await?;
        let end_date = session
            .input_value(&field_input("calendar", "end_date"))
            .await?;
        let monday = session.is_checked(&day_checkbox("monday")).await?;
        let tuesday = session.is_checked(&day_checkbox("tuesday")).await?;
        let wednesday = session.is_checked(&day_checkbox("wednesday")).await?;

        if service_id != fixtures::SERVICE_ID
            || start_date != fixtures::CALENDAR_START_DATE
            || end_date != fixtures::CALENDAR_END_DATE
            || !monday
            || !tuesday
            || wednesday
        {
            return Err(HarnessError::Assertion(format!(
                "calendar did not round-trip: service_id={service_id} \
                 start={start_date} end={end_date} mon={monday} tue={tuesday} wed={wednesday}"
            )));
        }
        Ok(())
    }
    .boxed()
}

/// Create a schedule exception replacing the test calendar on one date
pub fn create_exception(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let session = ctx.session()?;

        open_entity_tab(session, "exception").await?;
        session
            .type_text(
                &field_input("exception", "name"),
                fixtures::EXCEPTION_NAME,
                true,
            )
            .await?;
        session
            .click("[data-test-id=\"exception-add-date-button\"]")
            .await?;
        session
            .type_text(
                "[data-test-id=\"exception-date-0-input-container\"] input",
                fixtures::EXCEPTION_DATE,
                true,
            )
            .await?;
        session.click(SAVE_ENTITY_BUTTON).await?;

        reload_entity_tab(session, "exception").await?;
        session
            .expect_text(ENTITY_LIST, fixtures::EXCEPTION_NAME)
            .await?;
        Ok(())
    }
    .boxed()
}

/// Create a flat fare
pub fn create_fare(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let session = ctx.session()?;

        open_entity_tab(session, "fare").await?;
        session
            .type_text(&field_input("fare", "fare_id"), fixtures::FARE_ID, true)
            .await?;
        session
            .type_text(&field_input("fare", "price"), fixtures::FARE_PRICE, true)
            .await?;
        session
            .type_text(
                &field_input("fare", "currency_type"),
                fixtures::FARE_CURRENCY,
                true,
            )
            .await?;
        session.click(SAVE_ENTITY_BUTTON).await?;

        reload_entity_tab(session, "fare").await?;
        session.expect_text(ENTITY_LIST, fixtures::FARE_ID).await?;
        Ok(())
    }
    .boxed()
}

/// Clone the test calendar, rename the clone with the delete suffix, save
/// it, delete it, and verify it left the entity list.
pub fn calendar_clone_and_delete(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let session = ctx.session()?;
        let doomed = format!("{}{}", fixtures::SERVICE_ID, fixtures::DELETE_SUFFIX);

        open_entity_tab(session, "calendar").await?;
        select_entity(session, fixtures::SERVICE_ID).await?;
        session.click(CLONE_ENTITY_BUTTON).await?;
        session
            .type_text(&field_input("calendar", "service_id"), &doomed, true)
            .await?;
        session.click(SAVE_ENTITY_BUTTON).await?;

        reload_entity_tab(session, "calendar").await?;
        // Present before deletion, by construction.
        session.expect_text(ENTITY_LIST, &doomed).await?;

        select_entity(session, &doomed).await?;
        session.click(DELETE_ENTITY_BUTTON).await?;
        session.click(MODAL_CONFIRM).await?;

        reload_entity_tab(session, "calendar").await?;
        let listing = session.inner_html(ENTITY_LIST).await?;
        if listing.contains(&doomed) {
            return Err(HarnessError::Assertion(format!(
                "`{doomed}` still listed after deletion"
            )));
        }
        info!(%doomed, "cloned calendar deleted");
        Ok(())
    }
    .boxed()
}

/// Open an entity tab and start a new entity
async fn open_entity_tab(session: &Session, entity: &str) -> HarnessResult<()> {
    session.click(&nav_button(entity)).await?;
    session.click(NEW_ENTITY_BUTTON).await?;
    Ok(())
}

/// Reload the editor and reopen an entity tab without creating anything
pub(crate) async fn reload_entity_tab(session: &Session, entity: &str) -> HarnessResult<()> {
    session.reload().await?;
    session.wait_for_selector(EDITOR_SIDEBAR).await?;
    session.click(&nav_button(entity)).await?;
    session.wait_for_selector(ENTITY_LIST).await?;
    Ok(())
}

/// Select an entity in the active list by its displayed label
pub(crate) async fn select_entity(session: &Session, label: &str) -> HarnessResult<()> {
    let rows = session
        .all_text("[data-test-id=\"editor-entity-list\"] [data-test-id=\"entity-list-row\"]")
        .await?;
    let position = rows
        .iter()
        .position(|row| row.contains(label))
        .ok_or_else(|| HarnessError::EntityNotFound(label.to_string()))?;
    session
        .click(&format!(
            "[data-test-id=\"editor-entity-list\"] [data-test-id=\"entity-list-row\"]:nth-of-type({})",
            position + 1
        ))
        .await?;
    Ok(())
}
