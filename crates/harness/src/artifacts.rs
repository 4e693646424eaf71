//! Run artifacts - timestamped logs, screenshots, and the JSON report

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::HarnessResult;

/// Naming scheme for everything a run leaves behind.
///
/// All artifacts share the run's start timestamp, so one failed run's
/// screenshot, logs, and report can be matched up afterwards.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    root: PathBuf,
    stamp: String,
}

impl RunArtifacts {
    /// Create the artifact directory and fix the run stamp
    pub fn create(root: &Path, started: DateTime<Local>) -> HarnessResult<Self> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            stamp: started.format("%Y-%m-%dT%H-%M-%S").to_string(),
        })
    }

    /// The run's start timestamp, formatted for filenames
    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Structured run log (harness-side events)
    pub fn run_log_path(&self) -> PathBuf {
        self.root.join(format!("e2e-run-{}.log", self.stamp))
    }

    /// Structured browser-event log (in-page console, JSON lines)
    pub fn browser_log_path(&self) -> PathBuf {
        self.root.join(format!("browser-events-{}.log", self.stamp))
    }

    /// Full-page screenshot for one failed test
    pub fn screenshot_path(&self, test_name: &str) -> PathBuf {
        self.root
            .join(format!("{}-{}.png", sanitize(test_name), self.stamp))
    }

    /// JSON run report
    pub fn report_path(&self) -> PathBuf {
        self.root.join(format!("test-results-{}.json", self.stamp))
    }

    /// Initialize process-wide logging: human-readable output on stdout and
    /// the same stream, without ANSI escapes, appended to the run log file.
    ///
    /// Call once per process; a second call returns an error from the
    /// subscriber registry.
    pub fn init_logging(&self) -> HarnessResult<()> {
        let file = std::fs::File::create(self.run_log_path())?;
        tracing_subscriber::registry()
            .with(
                EnvFilter::from_default_env()
                    .add_directive("info".parse().expect("static directive")),
            )
            .with(fmt::layer())
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init();
        Ok(())
    }
}

/// Make a test name safe to use as a file stem
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn artifacts() -> (tempfile::TempDir, RunArtifacts) {
        let dir = tempfile::tempdir().unwrap();
        let started = Local.with_ymd_and_hms(2024, 5, 29, 10, 30, 0).unwrap();
        let artifacts = RunArtifacts::create(dir.path(), started).unwrap();
        (dir, artifacts)
    }

    #[test]
    fn stamp_is_filename_safe() {
        let (_dir, artifacts) = artifacts();
        assert_eq!(artifacts.stamp(), "2024-05-29T10-30-00");
        assert!(!artifacts.stamp().contains(':'));
    }

    #[test]
    fn screenshot_name_is_deterministic() {
        let (_dir, artifacts) = artifacts();
        let a = artifacts.screenshot_path("create project");
        let b = artifacts.screenshot_path("create project");
        assert_eq!(a, b);
        assert!(a
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("create-project-"));
    }

    #[test]
    fn artifact_names_share_the_run_stamp() {
        let (_dir, artifacts) = artifacts();
        for path in [
            artifacts.run_log_path(),
            artifacts.browser_log_path(),
            artifacts.screenshot_path("upload-gtfs"),
            artifacts.report_path(),
        ] {
            let name = path.file_name().unwrap().to_str().unwrap().to_string();
            assert!(name.contains(artifacts.stamp()), "{name}");
        }
    }

    #[test]
    fn sanitize_strips_path_characters() {
        assert_eq!(sanitize("a/b\\c d"), "a-b-c-d");
        assert_eq!(sanitize("calendar-round-trip"), "calendar-round-trip");
    }

    #[test]
    fn create_makes_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("artifacts/run");
        let started = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        RunArtifacts::create(&nested, started).unwrap();
        assert!(nested.is_dir());
    }
}
