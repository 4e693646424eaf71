//! Workflow scripts for the GTFS editor e2e suite
//!
//! Each workflow encodes one user-facing scenario as a sequence of session
//! driver calls with literal input values and literal expected-output
//! substrings. The suite is assembled here in dependency order; the
//! orchestrator in `editor-e2e-harness` does the rest.

pub mod fixtures;
pub mod workflows;

use editor_e2e_harness::{DependencySet, HarnessResult, RunConfig, Suite, TestCase};

use workflows::{auth, deployment, editor, feeds, patterns, projects};

/// Assemble the full suite in declaration order.
///
/// Families: everything after login depends on login; feed workflows
/// depend on the project; editor workflows depend on the editor session
/// being open; deployment depends on the uploaded feed version.
pub fn build_suite(config: &RunConfig) -> HarnessResult<Suite> {
    let test_timeout = config.timeouts.test;
    // Workflows that wait on backend jobs need headroom beyond the job
    // timeout itself.
    let job_timeout = config.timeouts.job + test_timeout;

    let root = DependencySet::root();
    let post_login = root.with(&["login"]);
    let post_project = post_login.with(&["create-project"]);
    let post_feed = post_project.with(&["create-feed-source"]);
    let post_upload = post_feed.with(&["upload-gtfs"]);
    let in_editor = post_project.with(&["create-scratch-feed-source", "open-editor"]);
    let on_route = in_editor.with(&["create-route"]);
    let on_pattern = on_route.with(&["create-pattern"]);
    let post_deploy = post_upload.with(&["create-deployment"]);

    let mut suite = Suite::new();

    suite.register(TestCase::new("login", auth::login).with_timeout(test_timeout))?;

    suite.register(
        TestCase::new("create-project", projects::create_project)
            .with_timeout(test_timeout)
            .depends_on(&post_login),
    )?;
    suite.register(
        TestCase::new("update-project-settings", projects::update_project_settings)
            .with_timeout(test_timeout)
            .depends_on(&post_project),
    )?;

    suite.register(
        TestCase::new("create-feed-source", feeds::create_feed_source)
            .with_timeout(test_timeout)
            .depends_on(&post_project),
    )?;
    suite.register(
        TestCase::new("upload-gtfs", feeds::upload_gtfs)
            .with_timeout(job_timeout)
            .depends_on(&post_feed),
    )?;
    suite.register(
        TestCase::new("download-feed-version", feeds::download_feed_version)
            .with_timeout(test_timeout)
            .depends_on(&post_upload),
    )?;
    suite.register(
        TestCase::new("create-scratch-feed-source", feeds::create_scratch_feed_source)
            .with_timeout(test_timeout)
            .depends_on(&post_project),
    )?;

    suite.register(
        TestCase::new("open-editor", editor::open_editor)
            .with_timeout(job_timeout)
            .depends_on(&post_project.with(&["create-scratch-feed-source"])),
    )?;
    suite.register(
        TestCase::new("create-agency", editor::create_agency)
            .with_timeout(test_timeout)
            .depends_on(&in_editor),
    )?;
    suite.register(
        TestCase::new("create-route", editor::create_route)
            .with_timeout(test_timeout)
            .depends_on(&in_editor.with(&["create-agency"])),
    )?;
    suite.register(
        TestCase::new("create-stop", editor::create_stop)
            .with_timeout(test_timeout)
            .depends_on(&in_editor),
    )?;
    suite.register(
        TestCase::new("calendar-round-trip", editor::calendar_round_trip)
            .with_timeout(test_timeout)
            .depends_on(&in_editor),
    )?;
    suite.register(
        TestCase::new("create-exception", editor::create_exception)
            .with_timeout(test_timeout)
            .depends_on(&in_editor.with(&["calendar-round-trip"])),
    )?;
    suite.register(
        TestCase::new("create-fare", editor::create_fare)
            .with_timeout(test_timeout)
            .depends_on(&in_editor),
    )?;
    suite.register(
        TestCase::new("calendar-clone-and-delete", editor::calendar_clone_and_delete)
            .with_timeout(test_timeout)
            .depends_on(&in_editor.with(&["calendar-round-trip"])),
    )?;

    suite.register(
        TestCase::new("create-pattern", patterns::create_pattern)
            .with_timeout(test_timeout)
            .depends_on(&on_route.with(&["create-stop"])),
    )?;
    suite.register(
        TestCase::new("add-timetable-trip", patterns::add_timetable_trip)
            .with_timeout(test_timeout)
            .depends_on(&on_pattern.with(&["calendar-round-trip"])),
    )?;

    suite.register(
        TestCase::new("create-deployment", deployment::create_deployment)
            .with_timeout(job_timeout)
            .depends_on(&post_upload),
    )?;
    suite.register(
        TestCase::new("query-trip-plan", deployment::query_trip_plan)
            .with_timeout(test_timeout)
            .depends_on(&post_deploy),
    )?;

    Ok(suite)
}
