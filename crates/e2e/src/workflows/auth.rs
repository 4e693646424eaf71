//! Login
//!
//! Authentication is an opaque precondition: drive the login modal with
//! the configured credentials and wait for the signed-in header. The modal
//! is a legacy surface without test ids, so class selectors are used here
//! and nowhere else.

use futures::future::{BoxFuture, FutureExt};

use editor_e2e_harness::{HarnessResult, RunContext};

const LOG_IN_BUTTON: &str = "[data-test-id=\"header-log-in-button\"]";
const LOGIN_MODAL: &str = ".login-modal";
const EMAIL_INPUT: &str = ".login-modal input[name=\"email\"]";
const PASSWORD_INPUT: &str = ".login-modal input[name=\"password\"]";
const SUBMIT_BUTTON: &str = ".login-modal button[type=\"submit\"]";
const USER_MENU: &str = "[data-test-id=\"header-user-menu\"]";

pub fn login(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let credentials = ctx.config.credentials.clone();
        let session = ctx.session()?;

        session.goto("/").await?;
        session.click(LOG_IN_BUTTON).await?;
        session.wait_for_selector(LOGIN_MODAL).await?;

        session
            .type_text(EMAIL_INPUT, &credentials.username, true)
            .await?;
        session
            .type_text(PASSWORD_INPUT, &credentials.password, true)
            .await?;
        session.click(SUBMIT_BUTTON).await?;

        session.wait_for_selector(USER_MENU).await?;
        Ok(())
    }
    .boxed()
}
