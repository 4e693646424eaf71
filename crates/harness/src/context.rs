//! The per-run context threaded through every workflow
//!
//! One `RunContext` exists per suite run. It owns the browser session, the
//! coverage reporter, the job poller, the shared result state, and the
//! fixture identifiers discovered along the way. Nothing in the harness is
//! ambient module-level state.

use std::path::PathBuf;
use tracing::warn;

use crate::artifacts::RunArtifacts;
use crate::config::RunConfig;
use crate::coverage::CoverageReporter;
use crate::error::{HarnessError, HarnessResult};
use crate::jobs::JobPoller;
use crate::session::Session;
use crate::state::RunState;

/// Identifiers produced as side effects of earlier tests and consumed by
/// later ones. Discovered from rendered links, never assigned.
#[derive(Debug, Default)]
pub struct Fixtures {
    pub project_id: Option<String>,
    pub feed_source_id: Option<String>,
    pub scratch_feed_source_id: Option<String>,
    pub router_id: Option<String>,
}

impl Fixtures {
    pub fn project_id(&self) -> HarnessResult<&str> {
        self.project_id
            .as_deref()
            .ok_or(HarnessError::FixtureMissing("project id"))
    }

    pub fn feed_source_id(&self) -> HarnessResult<&str> {
        self.feed_source_id
            .as_deref()
            .ok_or(HarnessError::FixtureMissing("feed source id"))
    }

    pub fn scratch_feed_source_id(&self) -> HarnessResult<&str> {
        self.scratch_feed_source_id
            .as_deref()
            .ok_or(HarnessError::FixtureMissing("scratch feed source id"))
    }

    pub fn router_id(&self) -> HarnessResult<&str> {
        self.router_id
            .as_deref()
            .ok_or(HarnessError::FixtureMissing("router id"))
    }
}

pub struct RunContext {
    pub config: RunConfig,
    pub artifacts: RunArtifacts,
    pub coverage: CoverageReporter,
    pub poller: JobPoller,
    pub state: RunState,
    pub fixtures: Fixtures,
    session: Option<Session>,
}

impl RunContext {
    /// Launch the browser and assemble a full run context
    pub async fn launch(config: RunConfig, artifacts: RunArtifacts) -> HarnessResult<Self> {
        let coverage = CoverageReporter::new(config.collect_coverage, &config.coverage_endpoint);
        let session = Session::launch(
            &config,
            coverage.clone(),
            &artifacts.browser_log_path(),
        )
        .await?;
        let poller = JobPoller::new(config.timeouts.job_monitor_mount, config.timeouts.job);

        Ok(Self {
            config,
            artifacts,
            coverage,
            poller,
            state: RunState::new(),
            fixtures: Fixtures::default(),
            session: Some(session),
        })
    }

    /// A context with no browser attached, for exercising the orchestrator
    /// in isolation.
    pub fn detached(config: RunConfig, artifacts: RunArtifacts) -> Self {
        let poller = JobPoller::new(config.timeouts.job_monitor_mount, config.timeouts.job);
        Self {
            config,
            artifacts,
            coverage: CoverageReporter::disabled(),
            poller,
            state: RunState::new(),
            fixtures: Fixtures::default(),
            session: None,
        }
    }

    /// The run's browser session
    pub fn session(&self) -> HarnessResult<&Session> {
        self.session.as_ref().ok_or(HarnessError::NoSession)
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Capture the failure screenshot for `test_name`, returning its path.
    /// Skipped silently on detached contexts.
    pub async fn capture_failure_screenshot(&self, test_name: &str) -> Option<PathBuf> {
        let session = self.session.as_ref()?;
        let path = self.artifacts.screenshot_path(test_name);
        match session.screenshot(&path).await {
            Ok(()) => Some(path),
            Err(err) => {
                warn!(%err, test = test_name, "failure screenshot could not be captured");
                None
            }
        }
    }

    /// Report coverage for the current page, if a session is attached
    pub async fn report_coverage(&self) -> HarnessResult<()> {
        match &self.session {
            Some(session) => self.coverage.report(session.page()).await,
            None => Ok(()),
        }
    }

    /// Release the browser session. Best-effort; errors are logged by the
    /// session itself.
    pub async fn teardown(mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    #[test]
    fn fixtures_error_until_discovered() {
        let mut fixtures = Fixtures::default();
        assert!(matches!(
            fixtures.project_id(),
            Err(HarnessError::FixtureMissing("project id"))
        ));
        fixtures.project_id = Some("abc123".to_string());
        assert_eq!(fixtures.project_id().unwrap(), "abc123");
    }

    #[tokio::test]
    async fn detached_context_has_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = RunArtifacts::create(dir.path(), Local::now()).unwrap();
        let ctx = RunContext::detached(RunConfig::default(), artifacts);

        assert!(!ctx.has_session());
        assert!(matches!(ctx.session(), Err(HarnessError::NoSession)));
        // Coverage and screenshots degrade to no-ops without a browser.
        ctx.report_coverage().await.unwrap();
        assert!(ctx.capture_failure_screenshot("anything").await.is_none());
    }
}
