//! Deployment to the trip-planning server and live query verification

use chrono::Local;
use futures::future::{BoxFuture, FutureExt};
use tracing::info;

use editor_e2e_harness::discover::resolve_entity_id;
use editor_e2e_harness::{HarnessError, HarnessResult, RunContext};

use crate::fixtures;

const DEPLOYMENTS_TAB: &str = "[data-test-id=\"project-deployments-tab\"]";
const NEW_DEPLOYMENT_BUTTON: &str = "[data-test-id=\"create-new-deployment-button\"]";
const DEPLOYMENT_NAME_INPUT: &str = "[data-test-id=\"deployment-name-input-container\"] input";
const DEPLOYMENT_SAVE_BUTTON: &str = "[data-test-id=\"deployment-save-button\"]";
const DEPLOYMENT_LINKS: &str = "[data-test-id=\"deployment-table\"] a[href*=\"/deployment/\"]";
const DEPLOY_TO_SERVER_BUTTON: &str = "[data-test-id=\"deploy-to-server-button\"]";
const ROUTER_LINKS: &str = "[data-test-id=\"deployment-router-link\"]";

/// Create a deployment from the uploaded feed version and push it to the
/// trip-planning server, recovering the router id it was registered
/// under.
pub fn create_deployment(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let project_id = ctx.fixtures.project_id()?.to_string();
        let name = fixtures::deployment_name(ctx.artifacts.stamp());
        let session = ctx.session()?;

        session.goto(&format!("/project/{project_id}")).await?;
        session.click(DEPLOYMENTS_TAB).await?;
        session.click(NEW_DEPLOYMENT_BUTTON).await?;
        session.type_text(DEPLOYMENT_NAME_INPUT, &name, true).await?;
        session.click(DEPLOYMENT_SAVE_BUTTON).await?;

        let deployment_id = resolve_entity_id(session, DEPLOYMENT_LINKS, &name).await?;
        session
            .goto(&format!("/project/{project_id}/deployment/{deployment_id}"))
            .await?;
        session.click(DEPLOY_TO_SERVER_BUTTON).await?;
        ctx.poller.wait_for_all_jobs(session).await?;

        let router_href = session.href(ROUTER_LINKS).await?;
        let router_id = editor_e2e_harness::discover::id_from_href(&router_href)
            .ok_or_else(|| HarnessError::EntityNotFound(format!("router in `{router_href}`")))?;
        info!(%router_id, "deployment registered");

        ctx.fixtures.router_id = Some(router_id);
        Ok(())
    }
    .boxed()
}

/// Query the deployed router for a transit itinerary between the test
/// coordinates and verify the created stop appears in the response.
pub fn query_trip_plan(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let router_id = ctx.fixtures.router_id()?.to_string();
        let date = Local::now().format("%m-%d-%Y").to_string();
        let url = format!(
            "{otp}/{router_id}/plan?fromPlace={from}&toPlace={to}&time=08:00am&date={date}\
             &mode=TRANSIT,WALK&maxWalkDistance=804.672&arriveBy=false&wheelchair=false&locale=en",
            otp = ctx.config.otp_root,
            from = fixtures::PLAN_FROM_PLACE,
            to = fixtures::PLAN_TO_PLACE,
        );

        info!(%url, "querying trip plan");
        let response = reqwest::get(&url).await?;
        if !response.status().is_success() {
            return Err(HarnessError::Assertion(format!(
                "trip plan request returned {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        if !body.contains(fixtures::STOP_NAME) {
            return Err(HarnessError::Assertion(format!(
                "trip plan response does not mention `{}`",
                fixtures::STOP_NAME
            )));
        }
        Ok(())
    }
    .boxed()
}
