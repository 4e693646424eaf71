//! Feed source and feed version workflows

use futures::future::{BoxFuture, FutureExt};
use sha2::{Digest, Sha256};
use tracing::info;

use editor_e2e_harness::discover::resolve_entity_id;
use editor_e2e_harness::{HarnessError, HarnessResult, RunContext};

use crate::fixtures;

const CREATE_FEED_SOURCE_BUTTON: &str =
    "[data-test-id=\"project-header-create-new-feed-source-button\"]";
const FEED_SOURCE_NAME_INPUT: &str = "[data-test-id=\"feed-source-name-input-container\"] input";
const FEED_SOURCE_SAVE_BUTTON: &str = "[data-test-id=\"feed-source-save-button\"]";
const FEED_SOURCE_LINKS: &str = "[data-test-id=\"feed-source-table\"] a[href*=\"/feed/\"]";
const FEED_SOURCE_TABLE: &str = "[data-test-id=\"feed-source-table\"]";
const UPDATE_FEED_BUTTON: &str = "[data-test-id=\"feed-source-update-button\"]";
const UPLOAD_FEED_OPTION: &str = "[data-test-id=\"upload-feed-button\"]";
const FEED_FILE_INPUT: &str = "[data-test-id=\"upload-feed-modal\"] input[type=\"file\"]";
const CONFIRM_UPLOAD_BUTTON: &str = "[data-test-id=\"confirm-upload-button\"]";
const FEED_VERSION_PANEL: &str = "[data-test-id=\"feed-version-panel\"]";
const DOWNLOAD_VERSION_BUTTON: &str = "[data-test-id=\"download-feed-version-button\"]";

/// Create a feed source inside the project and recover its id
pub fn create_feed_source(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let name = fixtures::feed_source_name(ctx.artifacts.stamp());
        let id = create_named_feed_source(ctx, &name).await?;
        info!(%id, "feed source created");
        ctx.fixtures.feed_source_id = Some(id);
        Ok(())
    }
    .boxed()
}

/// Create the scratch feed source the editor workflows snapshot against
pub fn create_scratch_feed_source(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let name = fixtures::scratch_feed_source_name(ctx.artifacts.stamp());
        let id = create_named_feed_source(ctx, &name).await?;
        info!(%id, "scratch feed source created");
        ctx.fixtures.scratch_feed_source_id = Some(id);
        Ok(())
    }
    .boxed()
}

async fn create_named_feed_source(ctx: &mut RunContext, name: &str) -> HarnessResult<String> {
    let project_id = ctx.fixtures.project_id()?.to_string();
    let session = ctx.session()?;

    session.goto(&format!("/project/{project_id}")).await?;
    session.click(CREATE_FEED_SOURCE_BUTTON).await?;
    session.type_text(FEED_SOURCE_NAME_INPUT, name, true).await?;
    session.click(FEED_SOURCE_SAVE_BUTTON).await?;

    session.goto(&format!("/project/{project_id}")).await?;
    session.expect_text(FEED_SOURCE_TABLE, name).await?;
    resolve_entity_id(session, FEED_SOURCE_LINKS, name).await
}

/// Upload the GTFS fixture as a new feed version and wait for the
/// processing job to finish.
pub fn upload_gtfs(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let feed_id = ctx.fixtures.feed_source_id()?.to_string();
        let fixture = ctx.config.gtfs_fixture.clone();
        let session = ctx.session()?;

        session.goto(&format!("/feed/{feed_id}")).await?;
        session.click(UPDATE_FEED_BUTTON).await?;
        session.click(UPLOAD_FEED_OPTION).await?;
        session.upload_file(FEED_FILE_INPUT, &fixture).await?;
        session.click(CONFIRM_UPLOAD_BUTTON).await?;

        ctx.poller.wait_for_all_jobs(session).await?;

        session.goto(&format!("/feed/{feed_id}")).await?;
        session
            .expect_text(FEED_VERSION_PANEL, "Version 1")
            .await?;
        Ok(())
    }
    .boxed()
}

/// Download the processed feed version and verify it is byte-identical to
/// the uploaded fixture.
pub fn download_feed_version(ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
    async move {
        let feed_id = ctx.fixtures.feed_source_id()?.to_string();
        let fixture = ctx.config.gtfs_fixture.clone();
        let base_url = ctx.config.base_url.clone();
        let session = ctx.session()?;

        session.goto(&format!("/feed/{feed_id}")).await?;
        let href = session.href(DOWNLOAD_VERSION_BUTTON).await?;
        let url = if href.starts_with("http") {
            href
        } else {
            format!("{base_url}{href}")
        };

        info!(%url, "downloading feed version");
        let downloaded = reqwest::get(&url)
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let expected = sha256_hex(&std::fs::read(&fixture)?);
        let actual = sha256_hex(&downloaded);
        if actual != expected {
            return Err(HarnessError::Assertion(format!(
                "feed version digest mismatch: uploaded {expected}, downloaded {actual}"
            )));
        }
        Ok(())
    }
    .boxed()
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_matches_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn identical_bytes_hash_identically() {
        let fixture = b"GTFS fixture bytes".to_vec();
        assert_eq!(sha256_hex(&fixture), sha256_hex(&fixture.clone()));
        assert_ne!(sha256_hex(&fixture), sha256_hex(b"tampered"));
    }
}
