//! The test orchestrator
//!
//! Executes registered cases strictly in declaration order inside one
//! shared browser session. Each case is gated on the fail-fast flag and on
//! its declared dependencies having recorded a pass; a failing body gets a
//! screenshot and a coverage report before the cascade is armed, so the
//! failing test itself produces the run's final coverage report.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{error, info};

use crate::context::RunContext;
use crate::error::{HarnessError, HarnessResult};
use crate::state::TestCase;

/// Outcome of one case
#[derive(Debug, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
}

/// Outcome of the whole run
#[derive(Debug, Serialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> HarnessResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("results written to {}", path.display());
        Ok(())
    }
}

/// Dependency-gated sequential test orchestrator
#[derive(Default)]
pub struct Suite {
    cases: Vec<TestCase>,
    names: HashSet<String>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a case. Names must be unique within the run; dependency
    /// names are trusted to be declared earlier and are checked at
    /// invocation time.
    pub fn register(&mut self, case: TestCase) -> HarnessResult<()> {
        if !self.names.insert(case.name.clone()) {
            return Err(HarnessError::DuplicateTest(case.name));
        }
        self.cases.push(case);
        Ok(())
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Run every case in declaration order
    pub async fn run(self, ctx: &mut RunContext) -> SuiteReport {
        let started = Instant::now();
        let mut cases = Vec::with_capacity(self.cases.len());
        let mut passed = 0;
        let mut failed = 0;

        info!("running {} test(s)...", self.cases.len());

        for case in self.cases {
            let report = run_case(ctx, case).await;
            if report.passed {
                passed += 1;
                info!("✓ {} ({} ms)", report.name, report.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} - {}",
                    report.name,
                    report.error.as_deref().unwrap_or("unknown error")
                );
            }
            cases.push(report);
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        info!("");
        info!(
            "test results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        SuiteReport {
            total: cases.len(),
            passed,
            failed,
            duration_ms,
            cases,
        }
    }
}

/// Run one case through the full gate → body → failure-pipeline sequence
async fn run_case(ctx: &mut RunContext, case: TestCase) -> CaseReport {
    let started = Instant::now();
    let name = case.name.clone();
    info!(test = %name, "starting");

    let outcome = gated_body(ctx, &case).await;

    match outcome {
        Ok(()) => match ctx.report_coverage().await {
            Ok(()) => {
                ctx.state.record_pass(&name);
                CaseReport {
                    name,
                    passed: true,
                    duration_ms: started.elapsed().as_millis() as u64,
                    error: None,
                    screenshot: None,
                }
            }
            // A collector error counts against the test itself; the body
            // already finished, so there is no screenshot to take.
            Err(err) => {
                if ctx.config.fail_fast {
                    ctx.state.arm_fail_fast();
                }
                CaseReport {
                    name,
                    passed: false,
                    duration_ms: started.elapsed().as_millis() as u64,
                    error: Some(err.to_string()),
                    screenshot: None,
                }
            }
        },
        Err(err) => {
            // Failure pipeline, in fixed order: screenshot (skipped for
            // precondition aborts), coverage, then arm the cascade.
            let screenshot = if err.is_precondition() {
                None
            } else {
                ctx.capture_failure_screenshot(&name).await
            };
            if let Err(coverage_err) = ctx.report_coverage().await {
                error!(%coverage_err, test = %name, "coverage report failed during failure handling");
            }
            if ctx.config.fail_fast {
                ctx.state.arm_fail_fast();
            }
            CaseReport {
                name,
                passed: false,
                duration_ms: started.elapsed().as_millis() as u64,
                error: Some(err.to_string()),
                screenshot,
            }
        }
    }
}

/// Precondition gate plus body execution under the case timeout
async fn gated_body(ctx: &mut RunContext, case: &TestCase) -> HarnessResult<()> {
    ctx.state.check_ready(&case.name, &case.dependencies)?;

    match timeout(case.timeout, (case.body)(ctx)).await {
        Ok(result) => result,
        Err(_) => Err(HarnessError::Timeout(format!(
            "test `{}` after {:?}",
            case.name, case.timeout
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::RunArtifacts;
    use crate::config::RunConfig;
    use crate::state::DependencySet;
    use chrono::Local;
    use futures::future::{BoxFuture, FutureExt};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn detached_ctx(fail_fast: bool) -> (tempfile::TempDir, RunContext) {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = RunArtifacts::create(dir.path(), Local::now()).unwrap();
        let config = RunConfig {
            fail_fast,
            ..RunConfig::default()
        };
        let ctx = RunContext::detached(config, artifacts);
        (dir, ctx)
    }

    fn passing(_ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
        async move { Ok(()) }.boxed()
    }

    fn failing(_ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
        async move { Err(HarnessError::Assertion("boom".into())) }.boxed()
    }

    fn slow(_ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
        async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
        .boxed()
    }

    #[tokio::test]
    async fn passing_case_records_result() {
        let (_dir, mut ctx) = detached_ctx(true);
        let mut suite = Suite::new();
        suite.register(TestCase::new("login", passing)).unwrap();

        let report = suite.run(&mut ctx).await;
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 0);
        assert!(report.all_passed());
        assert!(ctx.state.passed("login"));
        // A passing test never produces a screenshot artifact.
        assert!(report.cases[0].screenshot.is_none());
    }

    #[tokio::test]
    async fn dependency_gating_skips_body() {
        static GATED_BODY_RAN: AtomicBool = AtomicBool::new(false);
        fn marker(_ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
            async move {
                GATED_BODY_RAN.store(true, Ordering::SeqCst);
                Ok(())
            }
            .boxed()
        }

        // fail_fast off so the gate failure is attributable to the
        // dependency alone.
        let (_dir, mut ctx) = detached_ctx(false);
        let post_login = DependencySet::root().with(&["login"]);

        let mut suite = Suite::new();
        suite.register(TestCase::new("login", failing)).unwrap();
        suite
            .register(TestCase::new("create-project", marker).depends_on(&post_login))
            .unwrap();

        let report = suite.run(&mut ctx).await;
        assert_eq!(report.failed, 2);
        assert!(!GATED_BODY_RAN.load(Ordering::SeqCst));

        let gated = &report.cases[1];
        let message = gated.error.as_deref().unwrap();
        assert!(message.contains("not completed"), "{message}");
        assert!(gated.screenshot.is_none());
    }

    #[tokio::test]
    async fn fail_fast_cascades_to_independent_tests() {
        static CASCADED_BODY_RAN: AtomicBool = AtomicBool::new(false);
        fn marker(_ctx: &mut RunContext) -> BoxFuture<'_, HarnessResult<()>> {
            async move {
                CASCADED_BODY_RAN.store(true, Ordering::SeqCst);
                Ok(())
            }
            .boxed()
        }

        let (_dir, mut ctx) = detached_ctx(true);
        let mut suite = Suite::new();
        suite.register(TestCase::new("first", failing)).unwrap();
        // No dependencies at all - the cascade alone must stop it.
        suite.register(TestCase::new("second", marker)).unwrap();

        let report = suite.run(&mut ctx).await;
        assert_eq!(report.failed, 2);
        assert!(!CASCADED_BODY_RAN.load(Ordering::SeqCst));
        assert!(ctx.state.failing_fast());

        let cascaded = &report.cases[1];
        assert!(cascaded
            .error
            .as_deref()
            .unwrap()
            .contains("failing fast"));
    }

    #[tokio::test]
    async fn without_fail_fast_later_tests_still_run() {
        let (_dir, mut ctx) = detached_ctx(false);
        let mut suite = Suite::new();
        suite.register(TestCase::new("first", failing)).unwrap();
        suite.register(TestCase::new("second", passing)).unwrap();

        let report = suite.run(&mut ctx).await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.passed, 1);
        assert!(!ctx.state.failing_fast());
        assert!(ctx.state.passed("second"));
    }

    #[tokio::test]
    async fn body_timeout_fails_the_case() {
        let (_dir, mut ctx) = detached_ctx(false);
        let mut suite = Suite::new();
        suite
            .register(
                TestCase::new("slow", slow).with_timeout(Duration::from_millis(50)),
            )
            .unwrap();

        let report = suite.run(&mut ctx).await;
        assert_eq!(report.failed, 1);
        assert!(report.cases[0]
            .error
            .as_deref()
            .unwrap()
            .contains("timed out"));
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let mut suite = Suite::new();
        suite.register(TestCase::new("login", passing)).unwrap();
        let err = suite.register(TestCase::new("login", passing)).unwrap_err();
        assert!(matches!(err, HarnessError::DuplicateTest(name) if name == "login"));
    }

    #[tokio::test]
    async fn report_serializes_to_json() {
        let (dir, mut ctx) = detached_ctx(true);
        let mut suite = Suite::new();
        suite.register(TestCase::new("only", passing)).unwrap();

        let report = suite.run(&mut ctx).await;
        let path = dir.path().join("report.json");
        report.write_json(&path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["total"], 1);
        assert_eq!(parsed["cases"][0]["name"], "only");
        assert_eq!(parsed["cases"][0]["passed"], true);
    }
}
