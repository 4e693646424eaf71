//! Run configuration and credentials

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::HarnessResult;

/// Configuration for one suite run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Origin of the application under test
    pub base_url: String,

    /// Root URL of the trip-planning (OTP) server
    pub otp_root: String,

    /// Login credentials, loaded once at run start
    pub credentials: Credentials,

    /// GTFS zip uploaded during the feed workflows
    pub gtfs_fixture: PathBuf,

    /// Directory receiving logs, screenshots, and the run report
    pub artifact_dir: PathBuf,

    /// Forward in-page coverage counters to the collector
    pub collect_coverage: bool,

    /// Coverage collector endpoint
    pub coverage_endpoint: String,

    /// Arm the fail-fast cascade on the first test failure
    pub fail_fast: bool,

    /// Run the browser headless
    pub headless: bool,

    pub timeouts: Timeouts,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9966".to_string(),
            otp_root: "http://localhost:8080/otp/routers".to_string(),
            credentials: Credentials::default(),
            gtfs_fixture: PathBuf::from("fixtures/test-gtfs.zip"),
            artifact_dir: PathBuf::from("test-results"),
            collect_coverage: false,
            coverage_endpoint: "http://localhost:9999/coverage/client".to_string(),
            fail_fast: true,
            headless: true,
            timeouts: Timeouts::default(),
        }
    }
}

/// Timeouts for the various wait classes
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Element appearance waits
    pub element: Duration,

    /// Backend job completion (upload, fetch, snapshot, deploy)
    pub job: Duration,

    /// Default per-test timeout
    pub test: Duration,

    /// Fixed settle delay after each navigation
    pub settle: Duration,

    /// Fixed delay before job polling, while the job monitor mounts
    pub job_monitor_mount: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element: Duration::from_secs(10),
            job: Duration::from_secs(100),
            test: Duration::from_secs(120),
            settle: Duration::from_secs(3),
            job_monitor_mount: Duration::from_secs(1),
        }
    }
}

/// Login credentials, supplied through a YAML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Load credentials from a YAML file
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}
