//! Project lifecycle workflows

use futures::future::{BoxFuture, FutureExt};
use tracing::info;

use editor_e2e_harness::discover::resolve_entity_id;
use editor_e2e_harness::{HarnessError, HarnessResult, RunContext};

use super::MODAL_CONFIRM;
use crate::fixtures;

const CREATE_PROJECT_BUTTON: &str = "[data-test-id=\"create-new-project-button\"]";
const PROJECT_NAME_INPUT: &str = "[data-test-id=\"project-name-input-container\"] input";
const PROJECT_SAVE_BUTTON: &str = "[data-test-id=\"project-settings-form-save-button\"]";
const PROJECT_LINKS: &str = "[data-test-id=\"project-list-table\"] a[href*=\"/project/\"]";
const DEFAULT_LAT_INPUT: &str = "[data-test-id=\"project-default-lat-input-container\"] input";
const DEFAULT_LON_INPUT: &str = "[data-test-id=\"project-default-lon-input-container\"] input";
const DELETE_PROJECT_BUTTON: &str = "[data-test-id=\"delete-project-button\"]";
const HOME_PROJECT_LIST: &str = "[data-test-id=\"project-list-table\"]";

/// Create the run's project from the home page, then recover its id from
/// the rendered project list.
pub fn create_project(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let name = fixtures::project_name(ctx.artifacts.stamp());
        let session = ctx.session()?;

        session.goto("/home").await?;
        session.click(CREATE_PROJECT_BUTTON).await?;
        session.type_text(PROJECT_NAME_INPUT, &name, true).await?;
        session.click(PROJECT_SAVE_BUTTON).await?;

        session.goto("/home").await?;
        session.expect_text(HOME_PROJECT_LIST, &name).await?;
        let id = resolve_entity_id(session, PROJECT_LINKS, &name).await?;
        info!(%id, "project created");

        ctx.fixtures.project_id = Some(id);
        Ok(())
    }
    .boxed()
}

/// Set the project's default location and confirm it survives a reload
pub fn update_project_settings(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let project_id = ctx.fixtures.project_id()?.to_string();
        let session = ctx.session()?;
        let settings_path = format!("/project/{project_id}/settings");

        session.goto(&settings_path).await?;
        session
            .type_text(DEFAULT_LAT_INPUT, fixtures::STOP_LAT, true)
            .await?;
        session
            .type_text(DEFAULT_LON_INPUT, fixtures::STOP_LON, true)
            .await?;
        session.click(PROJECT_SAVE_BUTTON).await?;

        session.goto(&settings_path).await?;
        let lat = session.input_value(DEFAULT_LAT_INPUT).await?;
        let lon = session.input_value(DEFAULT_LON_INPUT).await?;
        if lat != fixtures::STOP_LAT || lon != fixtures::STOP_LON {
            return Err(HarnessError::Assertion(format!(
                "default location did not persist: got ({lat}, {lon})"
            )));
        }
        Ok(())
    }
    .boxed()
}

/// Best-effort teardown: delete the run's project and verify it left the
/// home page list. Runs after the suite, outside test accounting.
pub async fn delete_project(ctx: &mut RunContext) -> HarnessResult<()> {
    let project_id = ctx.fixtures.project_id()?.to_string();
    let name = fixtures::project_name(ctx.artifacts.stamp());
    let session = ctx.session()?;

    session
        .goto(&format!("/project/{project_id}/settings"))
        .await?;
    session.click(DELETE_PROJECT_BUTTON).await?;
    session.click(MODAL_CONFIRM).await?;

    session.goto("/home").await?;
    let listing = session.inner_html(HOME_PROJECT_LIST).await?;
    if listing.contains(&name) {
        return Err(HarnessError::Assertion(format!(
            "project `{name}` still listed after deletion"
        )));
    }
    info!(%project_id, "project deleted");
    Ok(())
}
