//! Asynchronous job polling
//!
//! Backend jobs (upload, fetch, snapshot, deploy) surface only through the
//! app's job-monitor sidebar. The poller treats a job as an opaque atomic
//! step: wait for the monitor to mount, wait for the active-jobs indicator,
//! wait for the all-complete indicator within the job timeout, then clear
//! the completed list. A job that never completes is a timeout error like
//! any other.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::HarnessResult;
use crate::session::Session;

const POSSIBLY_ACTIVE_JOBS: &str = "[data-test-id=\"possibly-active-jobs\"]";
const ALL_JOBS_COMPLETED: &str = "[data-test-id=\"all-jobs-completed\"]";
const CLEAR_COMPLETED_JOBS: &str = "[data-test-id=\"clear-completed-jobs-button\"]";

#[derive(Debug, Clone)]
pub struct JobPoller {
    /// Fixed delay while the job-monitor UI mounts
    mount_delay: Duration,

    /// Bound on the wait for job completion
    job_timeout: Duration,
}

impl JobPoller {
    pub fn new(mount_delay: Duration, job_timeout: Duration) -> Self {
        Self {
            mount_delay,
            job_timeout,
        }
    }

    pub fn job_timeout(&self) -> Duration {
        self.job_timeout
    }

    /// Block until every pending backend job reports completion, then
    /// clear the completed list.
    pub async fn wait_for_all_jobs(&self, session: &Session) -> HarnessResult<()> {
        debug!(mount_delay = ?self.mount_delay, "waiting for job monitor to mount");
        sleep(self.mount_delay).await;

        session.wait_for_selector(POSSIBLY_ACTIVE_JOBS).await?;
        debug!("job monitor active, waiting for completion");

        session
            .wait_for_selector_with(ALL_JOBS_COMPLETED, self.job_timeout, true)
            .await?;
        info!("all jobs completed");

        session.click(CLEAR_COMPLETED_JOBS).await?;
        Ok(())
    }
}
