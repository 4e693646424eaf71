//! E2E suite entry point
//!
//! This is the test binary that drives the GTFS editor through a real
//! browser. Run with: cargo test --package editor-e2e --test e2e -- [args]

use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use tracing::{error, warn};

use editor_e2e::{build_suite, workflows};
use editor_e2e_harness::{
    Credentials, HarnessResult, RunArtifacts, RunConfig, RunContext, Timeouts,
};

#[derive(Parser, Debug)]
#[command(name = "editor-e2e")]
#[command(about = "End-to-end test runner for the GTFS editor")]
struct Args {
    /// Origin of the application under test
    #[arg(long, default_value = "http://localhost:9966")]
    base_url: String,

    /// Root URL of the trip-planning server's router registry
    #[arg(long, default_value = "http://localhost:8080/otp/routers")]
    otp_root: String,

    /// YAML file with login credentials ({username, password})
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,

    /// GTFS zip uploaded during the feed workflows
    #[arg(long, default_value = "fixtures/test-gtfs.zip")]
    gtfs_fixture: PathBuf,

    /// Directory for logs, screenshots, and the run report
    #[arg(short, long, default_value = "test-results")]
    artifacts: PathBuf,

    /// Forward in-page coverage counters to the collector
    #[arg(long)]
    collect_coverage: bool,

    /// Coverage collector endpoint
    #[arg(long, default_value = "http://localhost:9999/coverage/client")]
    coverage_endpoint: String,

    /// Keep running remaining tests after a failure
    #[arg(long)]
    no_fail_fast: bool,

    /// Run the browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Bound on backend job completion, in seconds
    #[arg(long, default_value = "100")]
    job_timeout_secs: u64,

    /// Default per-test timeout, in seconds
    #[arg(long, default_value = "120")]
    test_timeout_secs: u64,
}

fn main() {
    let args = Args::parse();

    let credentials = match Credentials::load(&args.config) {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!("could not load credentials from {}: {err}", args.config.display());
            std::process::exit(2);
        }
    };

    let config = RunConfig {
        base_url: args.base_url,
        otp_root: args.otp_root,
        credentials,
        gtfs_fixture: args.gtfs_fixture,
        artifact_dir: args.artifacts,
        collect_coverage: args.collect_coverage,
        coverage_endpoint: args.coverage_endpoint,
        fail_fast: !args.no_fail_fast,
        headless: !args.headed,
        timeouts: Timeouts {
            job: std::time::Duration::from_secs(args.job_timeout_secs),
            test: std::time::Duration::from_secs(args.test_timeout_secs),
            ..Timeouts::default()
        },
    };

    let artifacts = match RunArtifacts::create(&config.artifact_dir, Local::now()) {
        Ok(artifacts) => artifacts,
        Err(err) => {
            eprintln!("could not create artifact directory: {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = artifacts.init_logging() {
        eprintln!("could not initialize logging: {err}");
        std::process::exit(2);
    }

    let runtime = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    match runtime.block_on(run(config, artifacts)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(err) => {
            error!("run aborted: {err}");
            std::process::exit(2);
        }
    }
}

async fn run(config: RunConfig, artifacts: RunArtifacts) -> HarnessResult<bool> {
    let suite = build_suite(&config)?;
    let mut ctx = RunContext::launch(config, artifacts).await?;

    let report = suite.run(&mut ctx).await;

    // Best-effort cleanup of the run's project; never fails the run.
    if let Err(err) = workflows::projects::delete_project(&mut ctx).await {
        warn!(%err, "teardown could not delete the run's project");
    }

    let written = report.write_json(&ctx.artifacts.report_path());
    ctx.teardown().await;
    written?;

    Ok(report.all_passed())
}
